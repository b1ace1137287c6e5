// src/shell.rs
//! Line-driven front end over a [`CutterSession`].
//!
//! `load` reads and decodes in a background task so the prompt stays
//! responsive; results come back over a channel and go through the
//! session's token check, so a newer `load` always wins.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::audio::{compute_peaks, AudioDecoder, DEFAULT_NUM_PEAKS, DEFAULT_OUTPUT_NAME};
use crate::error::{AudioError, Result};
use crate::session::{run_decode, CutterSession, DecodeOutcome, DecodeRequest, LoadOutcome};

const HELP: &str = "\
commands:
  load <path>         select a file and decode it
  start <seconds>     move the start of the selection
  end <seconds>       move the end of the selection
  range <s> <e>       set both ends
  info                show the loaded file and selection
  peaks [n]           print waveform peaks as JSON
  save [path]         write the selection as 16-bit WAV
  wait                block until pending loads finish
  help                show this text
  quit                exit";

#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Where `save` without a path writes `trimmed-audio.wav`
    pub output_dir: PathBuf,
    /// Peak count for `peaks` without an argument
    pub num_peaks: usize,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            num_peaks: DEFAULT_NUM_PEAKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Start(f64),
    End(f64),
    Range(f64, f64),
    Info,
    Peaks(Option<usize>),
    Save(Option<PathBuf>),
    Wait,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; blank lines and `#` comments give None
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (word, args.as_slice()) {
            ("load", _) if !rest.is_empty() => Command::Load(PathBuf::from(rest)),
            ("start", [v]) => Command::Start(parse_seconds(v)?),
            ("end", [v]) => Command::End(parse_seconds(v)?),
            ("range", [s, e]) => Command::Range(parse_seconds(s)?, parse_seconds(e)?),
            ("info", []) => Command::Info,
            ("peaks", []) => Command::Peaks(None),
            ("peaks", [n]) => Command::Peaks(Some(n.parse().map_err(|_| {
                AudioError::InvalidCommand(format!("'{}' is not a peak count", n))
            })?)),
            ("save", []) => Command::Save(None),
            ("save", _) => Command::Save(Some(PathBuf::from(rest))),
            ("wait", []) => Command::Wait,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => {
                return Err(AudioError::InvalidCommand(format!(
                    "'{}' (try 'help')",
                    line
                )))
            }
        };

        Ok(Some(command))
    }
}

fn parse_seconds(value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| AudioError::InvalidCommand(format!("'{}' is not a number of seconds", value)))
}

/// Run the shell until `quit` or end of input
///
/// Per-command failures are printed and the shell keeps going. Loads still
/// in flight at end of input are awaited before returning.
pub async fn run_shell<R, W>(
    decoder: Arc<dyn AudioDecoder>,
    options: ShellOptions,
    input: R,
    mut out: W,
) -> Result<CutterSession>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut shell = Shell {
        decoder,
        options,
        session: CutterSession::new(),
        in_flight: 0,
    };
    let (tx, mut rx) = mpsc::unbounded_channel::<(String, DecodeOutcome)>();
    let mut lines = input.lines();

    loop {
        tokio::select! {
            Some((name, outcome)) = rx.recv() => {
                shell.finish_load(&name, outcome, &mut out)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                let command = match Command::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        writeln!(out, "error: {}", e)?;
                        continue;
                    }
                };

                match command {
                    Command::Quit => break,
                    Command::Wait => shell.drain(&mut rx, &mut out).await?,
                    Command::Load(path) => shell.start_load(path, &tx, &mut out)?,
                    other => {
                        if let Err(e) = shell.execute(other, &mut out) {
                            warn!(error = %e, "command failed");
                            writeln!(out, "error: {}", e)?;
                        }
                    }
                }
            }
        }
    }

    shell.drain(&mut rx, &mut out).await?;
    out.flush()?;

    Ok(shell.session)
}

struct Shell {
    decoder: Arc<dyn AudioDecoder>,
    options: ShellOptions,
    session: CutterSession,
    in_flight: usize,
}

impl Shell {
    fn start_load<W: Write>(
        &mut self,
        path: PathBuf,
        tx: &mpsc::UnboundedSender<(String, DecodeOutcome)>,
        out: &mut W,
    ) -> Result<()> {
        let name = path.to_string_lossy().to_string();
        let request = self.session.select_file(name.clone());
        writeln!(out, "loading {} ...", name)?;

        self.in_flight += 1;
        let decoder = Arc::clone(&self.decoder);
        let tx = tx.clone();

        tokio::spawn(async move {
            let outcome = read_and_decode(decoder, request, path).await;
            // The receiver only goes away when the shell is shutting down
            let _ = tx.send((name, outcome));
        });

        Ok(())
    }

    fn finish_load<W: Write>(&mut self, name: &str, outcome: DecodeOutcome, out: &mut W) -> Result<()> {
        self.in_flight = self.in_flight.saturating_sub(1);

        match self.session.apply_decoded(outcome) {
            Ok(LoadOutcome::Applied) => {
                if let Some(buffer) = self.session.buffer() {
                    writeln!(
                        out,
                        "loaded {}: {:.2}s, {} Hz, {} channel(s)",
                        name,
                        buffer.duration_seconds(),
                        buffer.sample_rate(),
                        buffer.channel_count()
                    )?;
                }
            }
            Ok(LoadOutcome::Stale) => debug!(%name, "superseded load finished"),
            Err(e) => writeln!(out, "error: could not load {}: {}", name, e)?,
        }

        Ok(())
    }

    async fn drain<W: Write>(
        &mut self,
        rx: &mut mpsc::UnboundedReceiver<(String, DecodeOutcome)>,
        out: &mut W,
    ) -> Result<()> {
        while self.in_flight > 0 {
            match rx.recv().await {
                Some((name, outcome)) => self.finish_load(&name, outcome, out)?,
                None => break,
            }
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Start(seconds) => {
                let applied = self.session.set_start(seconds);
                self.report_range(applied.is_some(), out)
            }
            Command::End(seconds) => {
                let applied = self.session.set_end(seconds);
                self.report_range(applied.is_some(), out)
            }
            Command::Range(start, end) => {
                let applied = self.session.set_range(start, end);
                self.report_range(applied.is_some(), out)
            }
            Command::Info => self.info(out),
            Command::Peaks(count) => {
                let Some(buffer) = self.session.buffer() else {
                    writeln!(out, "no audio loaded")?;
                    return Ok(());
                };
                let peaks = compute_peaks(buffer, Some(count.unwrap_or(self.options.num_peaks)))?;
                let json = serde_json::to_string(&peaks)
                    .map_err(|e| AudioError::Encode(format!("Failed to serialize peaks: {}", e)))?;
                writeln!(out, "{}", json)?;
                Ok(())
            }
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.options.output_dir.join(DEFAULT_OUTPUT_NAME));
                if let Some(saved) = self.session.save(&path)? {
                    writeln!(out, "saved {}", saved.display())?;
                }
                Ok(())
            }
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                Ok(())
            }
            // Handled by the run loop
            Command::Load(_) | Command::Wait | Command::Quit => Ok(()),
        }
    }

    fn report_range<W: Write>(&self, applied: bool, out: &mut W) -> Result<()> {
        if applied {
            let range = self.session.range();
            writeln!(out, "range: {:.3}s - {:.3}s", range.start, range.end)?;
        } else {
            writeln!(out, "no audio loaded")?;
        }
        Ok(())
    }

    fn info<W: Write>(&self, out: &mut W) -> Result<()> {
        let Some(name) = self.session.file_name() else {
            writeln!(out, "no file selected")?;
            return Ok(());
        };

        writeln!(out, "file: {}", name)?;
        match self.session.buffer() {
            Some(buffer) => {
                let range = self.session.range();
                writeln!(
                    out,
                    "duration: {:.2}s, {} Hz, {} channel(s)",
                    buffer.duration_seconds(),
                    buffer.sample_rate(),
                    buffer.channel_count()
                )?;
                writeln!(
                    out,
                    "range: {:.3}s - {:.3}s ({:.3}s)",
                    range.start,
                    range.end,
                    range.duration()
                )?;
            }
            None if self.session.is_pending() => writeln!(out, "decoding ...")?,
            None => writeln!(out, "not loaded")?,
        }
        Ok(())
    }
}

async fn read_and_decode(
    decoder: Arc<dyn AudioDecoder>,
    request: DecodeRequest,
    path: PathBuf,
) -> DecodeOutcome {
    match tokio::fs::read(&path).await {
        Ok(bytes) => run_decode(decoder, request, bytes).await,
        Err(e) => DecodeOutcome {
            token: request.token,
            result: Err(AudioError::FileOpen {
                path: path.to_string_lossy().to_string(),
                source: e,
            }),
        },
    }
}
