// Test utilities for starting the upload server on a local port

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use upmark::config::ServerConfig;
use upmark::pipeline::{Pipeline, PipelineConfig};
use upmark::server::{self, AppState};
use upmark::storage::FilesystemSink;
use upmark::watermark::{Watermark, WatermarkOptions};

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn stored(&self, name: &str) -> Option<Vec<u8>> {
        std::fs::read(self.upload_dir().join(name)).ok()
    }

    pub fn stored_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir()).map(|d| d.count()).unwrap_or(0)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start a server with default settings
pub async fn start() -> TestServer {
    start_with(|_, _| {}).await
}

/// Start a server after adjusting its configuration
pub async fn start_with(configure: impl FnOnce(&mut ServerConfig, &mut PipelineConfig)) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    std::fs::write(&index, "<html><body><form>upload</form></body></html>").unwrap();

    let mut server_config = ServerConfig {
        address: "127.0.0.1".to_string(),
        port: 0,
        index_file: index.to_string_lossy().into_owned(),
        ..ServerConfig::default()
    };
    let mut pipeline_config = PipelineConfig::default();
    configure(&mut server_config, &mut pipeline_config);

    let sink = FilesystemSink::new(dir.path().join("uploads"));
    sink.ensure_root().unwrap();

    let watermark = Watermark::new(
        RgbaImage::from_pixel(16, 8, Rgba([255, 0, 0, 255])),
        WatermarkOptions::default(),
    )
    .unwrap();
    let pipeline = Pipeline::new(pipeline_config, Arc::new(watermark));
    let state = AppState::new(pipeline, Arc::new(sink), server_config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let serve_state = state.clone();
    let handle = tokio::spawn(async move {
        let _ = server::serve(listener, serve_state).await;
    });

    TestServer {
        base_url: format!("http://{}", addr),
        state,
        dir,
        handle,
    }
}

/// Encode a solid image in the given container
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([40, 120, 200, 255]));
    let dynamic = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    let mut buffer = Cursor::new(Vec::new());
    dynamic.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Multipart form with the image in field `file`
pub fn upload_form(name: &str, data: Vec<u8>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(data).file_name(name.to_string());
    reqwest::multipart::Form::new().part("file", part)
}

pub fn exists(path: &Path) -> bool {
    path.is_file()
}
