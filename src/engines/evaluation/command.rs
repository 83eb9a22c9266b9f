use crate::{
    config::EvaluatorConfig,
    engines::evaluation::CandidateEvaluator,
    engines::metrics::ReportParser,
    error::{Result, StratevolveError},
    types::PerformanceReport,
};
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Evaluates candidates by piping them through an external backtest runner.
///
/// The runner gets the strategy source on stdin and prints the rendered
/// report on stdout. Runs longer than the configured timeout are killed.
pub struct CommandEvaluator {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    parser: ReportParser,
}

impl CommandEvaluator {
    pub fn new(config: &EvaluatorConfig) -> Result<Self> {
        Ok(Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            parser: ReportParser::new()?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the external command and return its stdout
    fn render_report(&self, source_text: &str) -> Result<String> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StratevolveError::Evaluation(format!("Failed to start {}: {}", self.command, e))
            })?;

        let writer = child.stdin.take().map(|mut stdin| {
            let source = source_text.to_owned();
            // A runner that exits without reading stdin closes the pipe;
            // its exit status decides the outcome.
            thread::spawn(move || {
                let _ = stdin.write_all(source.as_bytes());
            })
        });
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = self.wait_with_deadline(&mut child)?;

        if let Some(writer) = writer {
            let _ = writer.join();
        }
        let stdout = join_reader(stdout)?;
        let stderr = join_reader(stderr)?;

        if !status.success() {
            return Err(StratevolveError::Evaluation(format!(
                "{} exited with {}: {}",
                self.command,
                status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            log::debug!("{} stderr: {}", self.command, stderr.trim());
        }

        Ok(stdout)
    }

    fn wait_with_deadline(&self, child: &mut Child) -> Result<std::process::ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let polled = child.try_wait().map_err(|e| {
                StratevolveError::Evaluation(format!("Failed to poll {}: {}", self.command, e))
            })?;
            if let Some(status) = polled {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(StratevolveError::Evaluation(format!(
                    "{} timed out after {:?}",
                    self.command, self.timeout
                )));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl CandidateEvaluator for CommandEvaluator {
    fn evaluate(&mut self, source_text: &str) -> Result<PerformanceReport> {
        let rendered = self.render_report(source_text)?;
        let report = self.parser.parse(&rendered)?;
        log::debug!("Backtest report: {:?}", report);
        Ok(report)
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> Option<JoinHandle<std::io::Result<String>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            // Invalid UTF-8 is left for the report parser to reject
            Ok(String::from_utf8_lossy(&buf).into_owned())
        })
    })
}

fn join_reader(handle: Option<JoinHandle<std::io::Result<String>>>) -> Result<String> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| StratevolveError::Evaluation("Output reader panicked".to_string()))?
            .map_err(|e| {
                StratevolveError::Evaluation(format!("Failed to read runner output: {}", e))
            }),
        None => Ok(String::new()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str, timeout_secs: u64) -> CommandEvaluator {
        let config = EvaluatorConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout_secs,
        };
        CommandEvaluator::new(&config).unwrap()
    }

    #[test]
    fn test_evaluate_parses_runner_output() {
        let mut evaluator = shell(
            "cat > /dev/null; printf 'Net profit 20%%\\nMax drawdown -10%%\\nProfit factor 1.5\\n\
             Sharpe ratio 1.2\\nTotal closed trades 40\\nWin rate 55%%\\n'",
            10,
        );
        let report = evaluator.evaluate("strategy(\"x\")").unwrap();
        assert!((report.net_profit_pct - 20.0).abs() < 1e-9);
        assert!((report.max_drawdown_pct + 10.0).abs() < 1e-9);
        assert_eq!(report.total_trades, 40);
        assert!((report.win_rate - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_runner_receives_source_on_stdin() {
        // Echo the trade count back from the source text
        let mut evaluator = shell(
            "n=$(cat); printf 'Net profit 1%%\\nMax drawdown 1%%\\nProfit factor 1\\n\
             Sharpe ratio 1\\nTotal closed trades %s\\nWin rate 50%%\\n' \"$n\"",
            10,
        );
        let report = evaluator.evaluate("17").unwrap();
        assert_eq!(report.total_trades, 17);
    }

    #[test]
    fn test_non_zero_exit_is_evaluation_error() {
        let mut evaluator = shell("echo 'login failed' >&2; exit 3", 10);
        let err = evaluator.evaluate("code").unwrap_err();
        assert!(err.is_evaluation_failure());
        assert!(err.to_string().contains("login failed"));
    }

    #[test]
    fn test_incomplete_report_is_parse_error() {
        let mut evaluator = shell("cat > /dev/null; echo 'Net profit 5%'", 10);
        let err = evaluator.evaluate("code").unwrap_err();
        assert!(matches!(err, StratevolveError::Parse { .. }));
    }

    #[test]
    fn test_binary_output_is_parse_error() {
        let mut evaluator = shell("cat > /dev/null; printf '\\377\\376 garbage'", 10);
        let err = evaluator.evaluate("code").unwrap_err();
        assert!(matches!(err, StratevolveError::Parse { .. }));
        assert!(err.is_evaluation_failure());
    }

    #[test]
    fn test_timeout_kills_runner() {
        let mut evaluator =
            shell("sleep 5", 10).with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = evaluator.evaluate("code").unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_binary_is_evaluation_error() {
        let config = EvaluatorConfig {
            command: "/nonexistent/backtest-runner".to_string(),
            ..Default::default()
        };
        let mut evaluator = CommandEvaluator::new(&config).unwrap();
        assert!(evaluator.evaluate("code").unwrap_err().is_evaluation_failure());
    }
}
