// Error mapping tests: which failures are the caller's fault and which are ours

use rstest::rstest;
use upmark::imaging::ImageError;
use upmark::pipeline::{PipelineError, Stage};

#[rstest]
#[case(ImageError::decode_failed("truncated"), 400)]
#[case(ImageError::image_bomb(50_000, 50_000, 100_000_000), 400)]
#[case(ImageError::invalid_dimensions(0, 10, "zero width"), 400)]
#[case(ImageError::unsupported_format("tiff"), 415)]
#[case(ImageError::FileTooLarge { size: 30, max_size: 20 }, 413)]
#[case(ImageError::resize_failed("buffer"), 500)]
#[case(ImageError::composite_failed("mark"), 500)]
#[case(ImageError::encode_failed("jpeg", "io"), 500)]
#[case(ImageError::write_failed("a.jpg", "read-only"), 500)]
fn test_image_error_status(#[case] err: ImageError, #[case] status: u16) {
    assert_eq!(err.to_http_status(), status);
    assert_eq!(err.is_client_error(), status < 500);
}

#[test]
fn test_pipeline_error_keeps_source_status() {
    let err = PipelineError::at(Stage::Decode, ImageError::unsupported_format("tiff"));
    assert_eq!(err.to_http_status(), 415);
    assert!(err.is_client_error());

    let err = PipelineError::at(Stage::Encode, ImageError::encode_failed("gif", "palette"));
    assert_eq!(err.to_http_status(), 500);
    assert!(!err.is_client_error());
}

#[test]
fn test_cancellation_is_not_a_client_error() {
    for stage in Stage::ALL {
        let err = PipelineError::Cancelled { stage };
        assert_eq!(err.to_http_status(), 504);
        assert!(!err.is_client_error());
        assert_eq!(err.stage(), stage);
    }
}

#[test]
fn test_error_messages_name_the_stage() {
    let err = PipelineError::at(Stage::Write, ImageError::write_failed("out.png", "disk full"));
    assert_eq!(
        err.to_string(),
        "write stage failed: Failed to write out.png: disk full"
    );
}
