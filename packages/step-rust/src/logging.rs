//! Log subscriber setup with secret masking.
//!
//! Every formatted log line passes through a [`SecretMask`] before it reaches
//! the output, so a credential that ends up in a message by accident is
//! still replaced with `****`.

use std::io;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use aakaas_core::MASK;

use crate::config::LogFormat;

// ---------------------------------------------------------------------------
// SecretMask
// ---------------------------------------------------------------------------

/// Set of secret values to scrub from text.
#[derive(Debug, Clone, Default)]
pub struct SecretMask {
    secrets: Arc<Vec<String>>,
}

impl SecretMask {
    /// Registers `secrets` together with their JSON and `Debug` escaped
    /// spellings. Empty values are ignored; longer values are replaced first
    /// so a secret containing another one is masked whole.
    pub fn new(secrets: impl IntoIterator<Item = String>) -> Self {
        let mut secrets: Vec<String> = secrets
            .into_iter()
            .filter(|s| !s.is_empty())
            .flat_map(|s| {
                let escaped: Vec<String> = escaped_forms(&s).collect();
                escaped.into_iter().chain(std::iter::once(s))
            })
            .collect();
        secrets.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        secrets.dedup();
        Self {
            secrets: Arc::new(secrets),
        }
    }

    /// Returns `text` with every registered secret replaced by the mask.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), MASK))
    }
}

/// `secret` as it appears inside a JSON string, a `Debug`-quoted string, or
/// a `Debug`-quoted string nested in JSON.
fn escaped_forms(secret: &str) -> impl Iterator<Item = String> {
    let debug = unquote(&format!("{secret:?}"));
    let json = json_escaped(secret);
    let json_of_debug = json_escaped(&debug);
    [Some(debug), json, json_of_debug].into_iter().flatten()
}

fn json_escaped(text: &str) -> Option<String> {
    serde_json::to_string(text).ok().map(|quoted| unquote(&quoted))
}

fn unquote(quoted: &str) -> String {
    quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted)
        .to_string()
}

// ---------------------------------------------------------------------------
// MaskingMakeWriter
// ---------------------------------------------------------------------------

/// `MakeWriter` that buffers each log record and scrubs it on flush.
#[derive(Debug, Clone)]
pub struct MaskingMakeWriter<M> {
    mask: SecretMask,
    inner: M,
}

impl<M> MaskingMakeWriter<M> {
    #[must_use]
    pub fn new(mask: SecretMask, inner: M) -> Self {
        Self { mask, inner }
    }
}

impl<'a, M> MakeWriter<'a> for MaskingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = MaskingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter {
            mask: self.mask.clone(),
            inner: self.inner.make_writer(),
            buf: Vec::new(),
        }
    }
}

/// Writer half of [`MaskingMakeWriter`]. Output is held back until `flush`
/// or drop so a secret split across `write` calls is still caught.
pub struct MaskingWriter<W: io::Write> {
    mask: SecretMask,
    inner: W,
    buf: Vec<u8>,
}

impl<W: io::Write> MaskingWriter<W> {
    fn drain(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.buf);
        let redacted = self.mask.redact(&text);
        self.buf.clear();
        self.inner.write_all(redacted.as_bytes())?;
        self.inner.flush()
    }
}

impl<W: io::Write> io::Write for MaskingWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()
    }
}

impl<W: io::Write> Drop for MaskingWriter<W> {
    fn drop(&mut self) {
        // Nowhere left to report a failed log write.
        let _ = self.drain();
    }
}

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// Installs the global log subscriber writing masked lines to stderr.
///
/// `RUST_LOG` overrides the level chosen by `verbose`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, verbose: bool, mask: SecretMask) -> anyhow::Result<()> {
    let default_directive = if verbose {
        "debug,hyper=info,hyper_util=info,reqwest=info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(MaskingMakeWriter::new(mask, io::stderr));

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))
}
