//! # fleetwatch-render
//!
//! Renders alarm charts to PNG images by driving an external headless
//! browser (`phantomjs` with a `render.js` capture script).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fleetwatch_render::{RenderError, RenderOptions, Renderer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RenderError> {
//!     let renderer = Renderer::builder()
//!         .binary_dir("/opt/phantomjs")
//!         .image_dir("/tmp/charts")
//!         .render_url("http://grafana.local/render")
//!         .build();
//!
//!     let opts = RenderOptions::new("alert-42", "web.prod", "cpu.idle", 1_700_000_000_000)
//!         .func("mean")
//!         .title("CPU idle");
//!
//!     match renderer.render_to_png(&opts).await {
//!         Ok(path) => println!("rendered {}", path.display()),
//!         Err(err) if err.is_retryable() => eprintln!("try again later: {err}"),
//!         Err(err) => return Err(err),
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod options;
mod renderer;

pub use error::RenderError;
pub use options::{image_file_name, render_url, RenderOptions, CHART_WINDOW_MS};
pub use renderer::{RenderSettings, Renderer, RendererBuilder, BROWSER_BIN, RENDER_SCRIPT};
