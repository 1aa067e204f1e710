//! Pluggable classifiers that may override the heuristic score.
//!
//! A predictor maps raw text to a phishing probability, asynchronously, or
//! fails. The detector only holds a shared reference and never decides when
//! a predictor is created or dropped.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub type PredictionFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<f64>> + Send + 'a>>;

pub trait ExternalPredictor: Send + Sync {
    fn predict<'a>(&'a self, text: &'a str) -> PredictionFuture<'a>;

    fn name(&self) -> &str {
        "external"
    }
}

/// Treats any value as a probability: NaN becomes 0, everything else is clamped to [0, 1].
pub fn coerce_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Adapts an async closure into a predictor.
pub struct FnPredictor<F> {
    func: F,
}

pub fn from_fn<F, Fut>(func: F) -> FnPredictor<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<f64>> + Send + 'static,
{
    FnPredictor { func }
}

impl<F, Fut> ExternalPredictor for FnPredictor<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<f64>> + Send + 'static,
{
    fn predict<'a>(&'a self, text: &'a str) -> PredictionFuture<'a> {
        Box::pin((self.func)(text.to_string()))
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Fails the inner prediction when it does not finish in time.
///
/// The detector has no deadline of its own; wrap a predictor in this when a
/// slow model should give way to the heuristic.
pub struct TimeoutPredictor<P> {
    inner: P,
    timeout: Duration,
}

impl<P: ExternalPredictor> TimeoutPredictor<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<P: ExternalPredictor> ExternalPredictor for TimeoutPredictor<P> {
    fn predict<'a>(&'a self, text: &'a str) -> PredictionFuture<'a> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, self.inner.predict(text)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "{} predictor timed out after {:?}",
                    self.inner.name(),
                    self.timeout
                )),
            }
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Runs an external program per prediction.
///
/// The text is written to the program's stdin; the first whitespace-separated
/// token of its stdout is read as the probability. Output that does not parse
/// as a number yields NaN, which coerces to 0. A non-zero exit status is a failure.
pub struct CommandPredictor {
    program: String,
    args: Vec<String>,
}

impl CommandPredictor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace. No shell quoting is interpreted.
    pub fn from_command_line(command_line: &str) -> anyhow::Result<Self> {
        let mut parts = command_line.split_whitespace().map(|s| s.to_string());
        let program = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("external command is empty"))?;
        Ok(Self::new(program, parts.collect()))
    }

    async fn run(&self, text: &str) -> anyhow::Result<f64> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        // Feed stdin while draining stdout, or a model that echoes its input
        // fills the stdout pipe and both sides block
        let stdin = child.stdin.take();
        let write_input = async move {
            if let Some(mut stdin) = stdin {
                // A model that never reads its input is allowed to exit early
                match stdin.write_all(text.as_bytes()).await {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
                // stdin is dropped here so the child sees EOF
            }
            Ok(())
        };

        let (written, output) = tokio::join!(write_input, child.wait_with_output());
        written?;
        let output = output?;
        if !output.status.success() {
            anyhow::bail!("{} exited with {}", self.program, output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = stdout
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok())
            .unwrap_or(f64::NAN);

        log::debug!("{} returned {:?} -> {}", self.program, stdout.trim(), value);
        Ok(value)
    }
}

impl ExternalPredictor for CommandPredictor {
    fn predict<'a>(&'a self, text: &'a str) -> PredictionFuture<'a> {
        Box::pin(self.run(text))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_probability() {
        assert_eq!(coerce_probability(0.3), 0.3);
        assert_eq!(coerce_probability(-2.0), 0.0);
        assert_eq!(coerce_probability(7.5), 1.0);
        assert_eq!(coerce_probability(f64::NAN), 0.0);
        assert_eq!(coerce_probability(f64::INFINITY), 1.0);
        assert_eq!(coerce_probability(f64::NEG_INFINITY), 0.0);
    }

    #[tokio::test]
    async fn test_fn_predictor() {
        let predictor = from_fn(|text: String| async move {
            Ok::<f64, anyhow::Error>(text.len() as f64 / 10.0)
        });
        let value = predictor.predict("hello").await.unwrap();
        assert_eq!(value, 0.5);
    }

    #[tokio::test]
    async fn test_timeout_predictor_passes_fast_result() {
        let predictor = TimeoutPredictor::new(
            from_fn(|_text: String| async { Ok::<f64, anyhow::Error>(0.8) }),
            Duration::from_secs(5),
        );
        assert_eq!(predictor.predict("x").await.unwrap(), 0.8);
    }

    #[tokio::test]
    async fn test_timeout_predictor_fails_slow_result() {
        let predictor = TimeoutPredictor::new(
            from_fn(|_text: String| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<f64, anyhow::Error>(0.8)
            }),
            Duration::from_millis(20),
        );
        let err = predictor.predict("x").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_command_line_parsing() {
        let predictor = CommandPredictor::from_command_line("python3 model.py --fast").unwrap();
        assert_eq!(predictor.program, "python3");
        assert_eq!(predictor.args, vec!["model.py", "--fast"]);
        assert!(CommandPredictor::from_command_line("   ").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_predictor_reads_stdout() {
        let predictor = CommandPredictor::new("cat", Vec::new());
        let value = predictor.predict("0.75 trailing words").await.unwrap();
        assert_eq!(value, 0.75);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_predictor_non_numeric_output() {
        let predictor = CommandPredictor::new("cat", Vec::new());
        let value = predictor.predict("not-a-number").await.unwrap();
        assert!(value.is_nan());
        assert_eq!(coerce_probability(value), 0.0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_predictor_echoing_large_input() {
        let predictor = CommandPredictor::new("cat", Vec::new());
        let text = format!("0.75 {}", "x".repeat(1024 * 1024));

        let value = tokio::time::timeout(Duration::from_secs(10), predictor.predict(&text))
            .await
            .expect("cat should finish echoing 1 MiB")
            .unwrap();
        assert_eq!(value, 0.75);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_predictor_failure_status() {
        let predictor =
            CommandPredictor::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        assert!(predictor.predict("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_command_predictor_missing_program() {
        let predictor = CommandPredictor::new("/nonexistent/phish-model", Vec::new());
        assert!(predictor.predict("anything").await.is_err());
    }
}
