//! Signal delivery to the encoder process.

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT: ask the encoder to finish the file and exit.
    Interrupt,
}

impl Signal {
    pub fn number(&self) -> i32 {
        match self {
            #[cfg(unix)]
            Signal::Interrupt => libc::SIGINT,
            #[cfg(not(unix))]
            Signal::Interrupt => 2,
        }
    }
}

pub trait ProcessController: Send + Sync {
    fn send_signal(&self, pid: u32, signal: Signal) -> Result<(), io::Error>;
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixProcessController;

#[cfg(unix)]
impl ProcessController for UnixProcessController {
    fn send_signal(&self, pid: u32, signal: Signal) -> Result<(), io::Error> {
        let pid_t: libc::pid_t = pid
            .try_into()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PID out of range"))?;

        let result = unsafe { libc::kill(pid_t, signal.number()) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

#[cfg(not(unix))]
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProcessController;

#[cfg(not(unix))]
impl ProcessController for UnsupportedProcessController {
    fn send_signal(&self, _pid: u32, _signal: Signal) -> Result<(), io::Error> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "interrupt signals are only available on unix",
        ))
    }
}

#[cfg(unix)]
pub type PlatformProcessController = UnixProcessController;
#[cfg(not(unix))]
pub type PlatformProcessController = UnsupportedProcessController;

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records signals instead of sending them.
    #[derive(Default)]
    pub struct MockProcessController {
        signals_sent: Mutex<Vec<(u32, Signal)>>,
        signal_error: Mutex<Option<io::Error>>,
    }

    impl MockProcessController {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_signal_error(self, error: io::Error) -> Self {
            *self.signal_error.lock().unwrap() = Some(error);
            self
        }

        pub fn signals_sent(&self) -> Vec<(u32, Signal)> {
            self.signals_sent.lock().unwrap().clone()
        }
    }

    impl ProcessController for MockProcessController {
        fn send_signal(&self, pid: u32, signal: Signal) -> Result<(), io::Error> {
            if let Some(err) = self.signal_error.lock().unwrap().take() {
                return Err(err);
            }
            self.signals_sent.lock().unwrap().push((pid, signal));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::MockProcessController;

    #[cfg(unix)]
    #[test]
    fn test_interrupt_is_sigint() {
        assert_eq!(Signal::Interrupt.number(), libc::SIGINT);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_controller_rejects_out_of_range_pid() {
        let err = UnixProcessController
            .send_signal(u32::MAX, Signal::Interrupt)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_controller_interrupts_child() {
        use std::os::unix::process::ExitStatusExt;

        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        UnixProcessController
            .send_signal(child.id(), Signal::Interrupt)
            .unwrap();
        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(libc::SIGINT));
    }

    #[test]
    fn test_mock_send_signal() {
        let mock = MockProcessController::new();
        mock.send_signal(1234, Signal::Interrupt).unwrap();
        assert_eq!(mock.signals_sent(), vec![(1234, Signal::Interrupt)]);
    }

    #[test]
    fn test_mock_signal_error() {
        let mock = MockProcessController::new().with_signal_error(io::Error::other("test error"));
        assert!(mock.send_signal(1234, Signal::Interrupt).is_err());
        assert!(mock.signals_sent().is_empty());
    }
}
