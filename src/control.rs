//! Remote configuration via Unix socket
//!
//! Accepts line commands over a Unix socket and turns them into brush
//! configuration changes, e.g. `palette ocean`, `brush 60`, `glow unlimited`.

use crate::config::GlowLimit;
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

const SOCKET_PATH: &str = "/tmp/heatbrush.sock";

/// Commands that can be sent over the socket
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Palette(String),
    BrushRadius(f32),
    FadeRadius(f32),
    Glow(GlowLimit),
    BurnSpeed(f32),
    Clear,
    Quit,
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    /// Create a new controller listening on the Unix socket
    pub fn new() -> Result<Self, String> {
        // Remove a stale socket from an earlier run
        let _ = std::fs::remove_file(SOCKET_PATH);

        let listener = UnixListener::bind(SOCKET_PATH)
            .map_err(|e| format!("Failed to bind socket: {}", e))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| format!("Failed to set non-blocking: {}", e))?;

        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || {
            Self::listener_loop(listener, sender);
        });

        log::info!("Control socket listening on {}", SOCKET_PATH);
        Ok(Self {
            receiver,
            _listener_thread: handle,
        })
    }

    fn listener_loop(listener: UnixListener, sender: Sender<Command>) {
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, sender);
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(std::time::Duration::from_millis(50));
                }
                Err(e) => {
                    log::warn!("Control socket closed: {}", e);
                    break;
                }
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: Sender<Command>) {
        // Accepted sockets inherit non-blocking mode on some platforms
        let _ = stream.set_nonblocking(false);
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            match parse_command(&line) {
                Some(cmd) => {
                    if sender.send(cmd).is_err() {
                        break;
                    }
                }
                None => log::warn!("Ignoring control command '{}'", line.trim()),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }
}

/// Parse one command line, e.g. `brush 40` or `glow 4`
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let arg = parts.next();

    let number = |s: Option<&str>| s.and_then(|v| v.parse::<f32>().ok());
    match verb {
        "palette" | "p" => arg.map(|k| Command::Palette(k.to_string())),
        "brush" | "radius" => number(arg).map(Command::BrushRadius),
        "fade" | "bleed" => number(arg).map(Command::FadeRadius),
        "glow" => arg.and_then(GlowLimit::parse).map(Command::Glow),
        "speed" | "burn" => number(arg).map(Command::BurnSpeed),
        "clear" | "c" => Some(Command::Clear),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}
