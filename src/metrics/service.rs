use super::{ServiceStatusProvider, UNKNOWN_STATUS};
use std::time::Duration;
use tokio::process::Command;

/// Service states as reported by `systemctl is-active`.
#[derive(Clone, Debug)]
pub struct Systemctl {
    program: String,
    timeout: Duration,
}

impl Systemctl {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "systemctl".to_string(),
            timeout,
        }
    }
}

impl ServiceStatusProvider for Systemctl {
    async fn status(&self, service: &str) -> String {
        let output = Command::new(&self.program)
            .arg("is-active")
            .arg(service)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, output).await {
            Ok(Ok(output)) => {
                // non-zero exit codes still carry a state, like "inactive"
                let status = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if status.is_empty() {
                    UNKNOWN_STATUS.to_string()
                } else {
                    status
                }
            }
            Ok(Err(err)) => {
                log::warn!("Could not check status for service {service}: {err}");
                UNKNOWN_STATUS.to_string()
            }
            Err(_) => {
                log::warn!(
                    "Timeout checking status for service {service} after {}",
                    humantime::format_duration(self.timeout)
                );
                UNKNOWN_STATUS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures_util::future::join;

    fn with_program(program: &str, timeout: Duration) -> Systemctl {
        Systemctl {
            program: program.to_string(),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let services = with_program("system2mqtt-no-such-binary", Duration::from_secs(5));
        assert_eq!(services.status("sshd.service").await, UNKNOWN_STATUS);
    }

    #[tokio::test]
    async fn test_timeout() {
        let services = Systemctl::new(Duration::ZERO);
        assert_eq!(services.status("sshd.service").await, UNKNOWN_STATUS);
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_siblings() {
        let broken = with_program("system2mqtt-no-such-binary", Duration::from_secs(5));
        let slow = Systemctl::new(Duration::from_nanos(1));
        let working = with_program("echo", Duration::from_secs(5));

        let (missing, (timed_out, active)) = join(
            broken.status("a.service"),
            join(slow.status("b.service"), working.status("c.service")),
        )
        .await;

        assert_eq!(missing, UNKNOWN_STATUS);
        assert_eq!(timed_out, UNKNOWN_STATUS);
        // echo prints its arguments, standing in for a state token
        assert_eq!(active, "is-active c.service");
    }

    #[tokio::test]
    async fn test_real_systemctl_never_fails() {
        let services = Systemctl::new(Duration::from_secs(5));
        let status = services.status("system2mqtt-no-such-unit.service").await;
        assert!(!status.is_empty());
    }
}
