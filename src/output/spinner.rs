use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// A braille spinner with a short status message, drawn on stderr
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    visible: Arc<AtomicBool>,
}

impl Spinner {
    /// Start a new spinner that advances every 80ms
    pub fn start(message: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let visible = Arc::new(AtomicBool::new(false));

        let running_clone = running.clone();
        let visible_clone = visible.clone();
        let message = message.to_string();

        let handle = thread::spawn(move || {
            let mut stderr = io::stderr();
            let mut frame = 0;

            while running_clone.load(Ordering::Relaxed) {
                eprint!("\r{} {}", FRAMES[frame % FRAMES.len()], message);
                stderr.flush().ok();
                visible_clone.store(true, Ordering::Relaxed);
                frame += 1;

                // Wait 80ms or until stopped
                for _ in 0..8 {
                    if !running_clone.load(Ordering::Relaxed) {
                        break;
                    }
                    thread::sleep(Duration::from_millis(10));
                }
            }
        });

        Self {
            running,
            handle: Some(handle),
            visible,
        }
    }

    /// Stop the spinner and clear its line
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }

        if self.visible.swap(false, Ordering::Relaxed) {
            eprint!("\r\x1b[2K");
            io::stderr().flush().ok();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if self.running.load(Ordering::Relaxed) {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_start_stop() {
        let mut spinner = Spinner::start("Fetching recommendation");
        std::thread::sleep(std::time::Duration::from_millis(100));
        spinner.stop();
        assert!(!spinner.visible.load(Ordering::Relaxed));
    }

    #[test]
    fn test_spinner_drop_stops_automatically() {
        let spinner = Spinner::start("Checking service");
        let running = spinner.running.clone();
        std::thread::sleep(std::time::Duration::from_millis(50));
        drop(spinner);
        assert!(!running.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stop_twice_is_harmless() {
        let mut spinner = Spinner::start("Estimating rainfall");
        spinner.stop();
        spinner.stop();
        assert!(spinner.handle.is_none());
    }
}
