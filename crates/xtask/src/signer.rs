//! Signing through an external command.
//!
//! The command receives the request as JSON on stdin and prints
//! `{"digest": "...", "signature": "..."}` on stdout. Empty stdout means the
//! signer finished without a result.

use std::process::Stdio;

use async_trait::async_trait;
use storage_core::{SignableRequest, SignedTransaction, SigningCapability, SigningError};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// [`SigningCapability`] backed by a shell command (e.g. a wallet CLI wrapper).
#[derive(Debug, Clone)]
pub struct CommandSigner {
    address: String,
    command: String,
}

impl CommandSigner {
    pub fn new(address: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            command: command.into(),
        }
    }
}

#[async_trait]
impl SigningCapability for CommandSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(
        &self,
        request: &SignableRequest,
    ) -> Result<Option<SignedTransaction>, SigningError> {
        let input = serde_json::to_vec(&request.to_json())
            .map_err(|e| SigningError::Rejected(format!("Failed to encode request: {}", e)))?;

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SigningError::Rejected(format!("Failed to start signer: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&input).await {
                tracing::debug!("Signer closed stdin early: {}", e);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SigningError::Rejected(format!("Signer did not finish: {}", e)))?;

        if !output.status.success() {
            return Err(SigningError::Rejected(format!(
                "signer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(None);
        }

        serde_json::from_str(stdout)
            .map(Some)
            .map_err(|e| SigningError::Rejected(format!("Invalid signer output: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use storage_core::{MockTransaction, SerializableTransaction, TransactionShape};

    use super::*;

    fn request() -> SignableRequest {
        SignableRequest {
            sender: "0xa11ce".into(),
            shape: TransactionShape::Structured,
            transaction: SerializableTransaction::new(Box::new(MockTransaction::new("reserve"))),
        }
    }

    #[tokio::test]
    async fn test_signed_output_is_parsed() {
        let signer = CommandSigner::new(
            "0xa11ce",
            r#"cat > /dev/null; printf '{"digest":"d1","signature":"s1"}'"#,
        );
        let signed = signer.sign(&request()).await.unwrap().unwrap();
        assert_eq!(signed.digest, "d1");
        assert_eq!(signed.signature.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn test_request_reaches_stdin() {
        // Echo the sender back as the digest.
        let signer = CommandSigner::new(
            "0xa11ce",
            r#"grep -q '"sender":"0xa11ce"' && printf '{"digest":"seen"}'"#,
        );
        let signed = signer.sign(&request()).await.unwrap().unwrap();
        assert_eq!(signed.digest, "seen");
    }

    #[tokio::test]
    async fn test_empty_output_is_no_result() {
        let signer = CommandSigner::new("0xa11ce", "cat > /dev/null");
        assert_eq!(signer.sign(&request()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_failed_command_is_rejection() {
        let signer = CommandSigner::new("0xa11ce", "cat > /dev/null; echo declined >&2; exit 3");
        let err = signer.sign(&request()).await.unwrap_err();
        assert!(matches!(&err, SigningError::Rejected(msg) if msg.contains("declined")));
    }
}
