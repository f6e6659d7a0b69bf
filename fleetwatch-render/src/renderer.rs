//! Headless-browser chart renderer.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::RenderError;
use crate::options::{image_file_name, render_url, RenderOptions};

/// Name of the browser binary inside the binary directory.
pub const BROWSER_BIN: &str = "phantomjs";

/// Name of the page-capture script inside the binary directory.
pub const RENDER_SCRIPT: &str = "render.js";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_WIDTH: u32 = 1000;
const DEFAULT_HEIGHT: u32 = 500;

/// Renderer settings as they appear in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub binary_dir: PathBuf,
    pub image_dir: PathBuf,
    pub render_url: String,
    pub timeout_secs: u64,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            binary_dir: PathBuf::from("."),
            image_dir: PathBuf::from("."),
            render_url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Renders chart pages to PNG files by driving an external browser.
///
/// Each render runs one child process. The child is killed if it outlives
/// the configured timeout.
///
/// # Example
///
/// ```rust,no_run
/// use fleetwatch_render::{RenderOptions, Renderer};
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), fleetwatch_render::RenderError> {
/// let renderer = Renderer::builder()
///     .binary_dir("/opt/phantomjs")
///     .image_dir("/var/lib/fleetwatch/images")
///     .render_url("http://grafana.local/render")
///     .timeout(Duration::from_secs(20))
///     .build();
///
/// let opts = RenderOptions::new("alert-42", "web.prod", "cpu.idle", 1_700_000_000_000);
/// let png = renderer.render_to_png(&opts).await?;
/// println!("chart at {}", png.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Renderer {
    binary_dir: PathBuf,
    image_dir: PathBuf,
    render_url: String,
    timeout: Duration,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Create a new builder.
    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    /// Build a renderer from configuration settings.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::builder()
            .binary_dir(&settings.binary_dir)
            .image_dir(&settings.image_dir)
            .render_url(&settings.render_url)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .size(settings.width, settings.height)
            .build()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the chart page for `opts`.
    pub fn render_url(&self, opts: &RenderOptions) -> String {
        render_url(&self.render_url, opts)
    }

    /// Absolute path the image for `opts` is written to.
    pub fn image_path(&self, opts: &RenderOptions) -> Result<PathBuf, RenderError> {
        absolute(&self.image_dir.join(image_file_name(&opts.id)))
    }

    /// Render the chart for `opts` and return the path of the PNG.
    pub async fn render_to_png(&self, opts: &RenderOptions) -> Result<PathBuf, RenderError> {
        let binary = absolute(&self.binary_dir.join(BROWSER_BIN))?;
        let script = absolute(&self.binary_dir.join(RENDER_SCRIPT))?;
        let png = self.image_path(opts)?;
        let url = self.render_url(opts);

        let mut cmd = Command::new(&binary);
        cmd.arg("--ignore-ssl-errors=true")
            .arg("--proxy-type=none")
            .arg(&script)
            .arg(format!("png={}", png.display()))
            .arg(format!("url={url}"))
            .arg(format!("width={}", self.width))
            .arg(format!("height={}", self.height))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(binary = %binary.display(), %url, "Starting renderer");
        let mut child = cmd.spawn().map_err(|source| {
            error!(binary = %binary.display(), "Failed to start renderer: {}", source);
            RenderError::Start {
                binary: binary.clone(),
                source,
            }
        })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, true));
        }

        let waited = tokio::time::timeout(self.timeout, child.wait()).await;
        let status = match waited {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => {
                error!("Failed waiting for renderer: {}", err);
                return Err(RenderError::Wait(err));
            }
            Err(_) => {
                error!("Render timed out (>{:?})", self.timeout);
                if let Err(err) = child.kill().await {
                    error!("Failed to kill renderer: {}", err);
                }
                return Err(RenderError::Timeout(self.timeout));
            }
        };

        if !status.success() {
            error!(id = %opts.id, "Renderer failed: {}", status);
            return Err(RenderError::Exit(status));
        }

        info!(path = %png.display(), "Image rendered");
        Ok(png)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

/// Builder for [`Renderer`].
#[derive(Debug, Clone)]
pub struct RendererBuilder {
    binary_dir: PathBuf,
    image_dir: PathBuf,
    render_url: String,
    timeout: Duration,
    width: u32,
    height: u32,
}

impl RendererBuilder {
    pub fn new() -> Self {
        Self {
            binary_dir: PathBuf::from("."),
            image_dir: PathBuf::from("."),
            render_url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Directory holding the browser binary and its render script.
    pub fn binary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binary_dir = dir.into();
        self
    }

    /// Directory images are written to.
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Base URL of the chart page.
    pub fn render_url(mut self, url: impl Into<String>) -> Self {
        self.render_url = url.into();
        self
    }

    /// How long a single render may run before it is killed.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Viewport size in pixels.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn build(self) -> Renderer {
        Renderer {
            binary_dir: self.binary_dir,
            image_dir: self.image_dir,
            render_url: self.render_url,
            timeout: self.timeout,
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for RendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn absolute(path: &Path) -> Result<PathBuf, RenderError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| RenderError::Path {
            path: path.to_path_buf(),
            source,
        })
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: R, is_stderr: bool) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!("renderer stderr: {}", line);
        } else {
            debug!("renderer stdout: {}", line);
        }
    }
}
