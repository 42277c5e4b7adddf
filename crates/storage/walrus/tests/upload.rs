use std::sync::Arc;

use chrono::Utc;
use storage_core::{
    ContentBlob, MockSigner, MockStorageNetwork, NetworkError, RetentionPeriod, SignBehavior,
    SigningError, StorageSource, TransactionShape, UploadError, UploadProgress, UploadStage,
    WriteBlobOutcome,
};
use storage_walrus::{
    BlobUrlResolver, OrchestratorOptions, ProgressSink, StorageEnvironment, UploadOrchestrator,
    progress_channel,
};
use tokio::sync::mpsc::UnboundedReceiver;

const CALLER: &str = "0xa11ce";

fn orchestrator(network: &MockStorageNetwork, options: OrchestratorOptions) -> UploadOrchestrator {
    UploadOrchestrator::new(
        Arc::new(network.clone()),
        BlobUrlResolver::new("https://agg.test/", StorageEnvironment::Testnet),
        options,
    )
}

fn ad_png() -> ContentBlob {
    ContentBlob::new(vec![0x89; 2048], "ad.png", "image/png", Utc::now())
}

fn drain(rx: &mut UnboundedReceiver<UploadProgress>) -> Vec<(UploadStage, u8)> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .map(|p| (p.stage, p.percent))
        .collect()
}

/// Billboard ad upload, end to end:
/// 1. 2048-byte PNG, 365-day lease → 365 epochs reserved
/// 2. Reservation signed by the wallet, transfer signs register_blob
/// 3. Network returns {b1, o1} → URL built from the object ID
#[tokio::test]
async fn test_managed_upload_scenario() {
    let network = MockStorageNetwork::new();
    network.push_write_result(Ok(WriteBlobOutcome {
        blob_id: Some("b1".into()),
        object_id: Some("o1".into()),
    }));
    let signer = MockSigner::new(CALLER);
    let (progress, mut rx) = progress_channel();

    let descriptor = orchestrator(&network, OrchestratorOptions::default())
        .upload(ad_png(), RetentionPeriod::from_days(365), CALLER, &signer, &progress)
        .await
        .expect("upload should succeed");

    assert_eq!(descriptor.url, "https://agg.test/o1");
    assert_eq!(descriptor.blob_id.as_deref(), Some("b1"));
    assert_eq!(descriptor.storage_source, StorageSource::Managed);

    let reservation = &network.reservations()[0];
    assert_eq!(reservation.epochs, 365);
    assert_eq!(reservation.size_bytes, 2048);
    assert_eq!(reservation.owner, CALLER);

    let write = &network.writes()[0];
    assert_eq!(write.size, 2048);
    assert_eq!(write.epochs, 365);
    assert!(write.deletable);
    assert_eq!(write.attributes.filename, "ad.png");
    assert_eq!(write.attributes.content_type, "image/png");
    assert_eq!(write.attributes.size, "2048");

    // Reservation + one transfer-time transaction, both attributed to the caller.
    assert_eq!(signer.sign_count(), 2);
    assert!(signer.requests().iter().all(|r| r.sender == CALLER));

    assert_eq!(
        drain(&mut rx),
        vec![
            (UploadStage::Preparing, 10),
            (UploadStage::Signing, 20),
            (UploadStage::Preparing, 40),
            (UploadStage::Uploading, 60),
            (UploadStage::Signing, 60),
            (UploadStage::Uploading, 80),
            (UploadStage::Finalizing, 90),
            (UploadStage::Completed, 100),
        ]
    );
}

#[tokio::test]
async fn test_unsigned_reservation_never_transfers() {
    let network = MockStorageNetwork::new();
    let signer = MockSigner::new(CALLER).then(SignBehavior::NoResult);
    let (progress, mut rx) = progress_channel();

    let err = orchestrator(&network, OrchestratorOptions::default())
        .upload(ad_png(), RetentionPeriod::from_days(1), CALLER, &signer, &progress)
        .await
        .unwrap_err();

    assert_eq!(err, UploadError::Signing(SigningError::NoResult));
    assert_eq!(network.write_count(), 0);

    let seen = drain(&mut rx);
    assert_eq!(seen.last(), Some(&(UploadStage::Idle, 0)));
    assert!(!seen.contains(&(UploadStage::Uploading, 60)));
}

#[tokio::test]
async fn test_rejected_transfer_signature_is_signing_error() {
    let network = MockStorageNetwork::new();
    let signer = MockSigner::new(CALLER)
        .then(SignBehavior::Sign)
        .then(SignBehavior::Reject("user declined".into()));

    let err = orchestrator(&network, OrchestratorOptions::default())
        .upload(
            ad_png(),
            RetentionPeriod::from_days(1),
            CALLER,
            &signer,
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        UploadError::Signing(SigningError::Rejected("user declined".into()))
    );
    assert!(err.to_string().contains("user declined"));
}

#[tokio::test]
async fn test_missing_blob_id_is_transfer_error() {
    let network = MockStorageNetwork::new();
    network.push_write_result(Ok(WriteBlobOutcome {
        blob_id: None,
        object_id: Some("o1".into()),
    }));
    let signer = MockSigner::new(CALLER);
    let progress = ProgressSink::disabled();

    let err = orchestrator(&network, OrchestratorOptions::default())
        .upload(ad_png(), RetentionPeriod::from_days(1), CALLER, &signer, &progress)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Transfer(_)));
    assert_eq!(progress.current(), UploadProgress::idle());
}

#[tokio::test]
async fn test_missing_object_id_falls_back_to_blob_url() {
    let network = MockStorageNetwork::new();
    network.push_write_result(Ok(WriteBlobOutcome {
        blob_id: Some("b1".into()),
        object_id: None,
    }));
    let signer = MockSigner::new(CALLER);

    let descriptor = orchestrator(&network, OrchestratorOptions::default())
        .upload(
            ad_png(),
            RetentionPeriod::from_days(1),
            CALLER,
            &signer,
            &ProgressSink::disabled(),
        )
        .await
        .unwrap();

    assert_eq!(descriptor.url, "https://testnet.walrus.app/blob/b1");
    assert_eq!(descriptor.blob_id.as_deref(), Some("b1"));
}

#[tokio::test]
async fn test_missing_object_id_without_fallback_is_addressing_error() {
    let network = MockStorageNetwork::new();
    network.push_write_result(Ok(WriteBlobOutcome {
        blob_id: Some("b1".into()),
        object_id: Some(String::new()),
    }));
    let signer = MockSigner::new(CALLER);
    let options = OrchestratorOptions {
        blob_url_fallback: false,
        ..OrchestratorOptions::default()
    };

    let err = orchestrator(&network, options)
        .upload(
            ad_png(),
            RetentionPeriod::from_days(1),
            CALLER,
            &signer,
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Addressing(_)));
}

#[tokio::test]
async fn test_retryable_client_error_resets_and_restarts() {
    let network = MockStorageNetwork::new();
    network.push_write_result(Err(NetworkError::RetryableClient(
        "committee changed".into(),
    )));
    let signer = MockSigner::new(CALLER);
    let (progress, mut rx) = progress_channel();

    let descriptor = orchestrator(&network, OrchestratorOptions::default())
        .upload(ad_png(), RetentionPeriod::from_days(3), CALLER, &signer, &progress)
        .await
        .unwrap();

    assert_eq!(descriptor.url, "https://agg.test/mock-object");
    assert_eq!(network.reset_count(), 1);
    // Fresh attempt: a new reservation is built and signed.
    assert_eq!(network.reservations().len(), 2);
    assert_eq!(network.write_count(), 2);
    assert_eq!(signer.sign_count(), 4);

    let seen = drain(&mut rx);
    let restart = seen
        .iter()
        .rposition(|p| *p == (UploadStage::Preparing, 10))
        .unwrap();
    assert!(restart > 0);
    // Percent never goes backwards within an attempt.
    assert!(seen[restart..].windows(2).all(|w| w[0].1 <= w[1].1));
    assert_eq!(seen.last(), Some(&(UploadStage::Completed, 100)));
}

#[tokio::test]
async fn test_retryable_client_resets_are_capped() {
    let network = MockStorageNetwork::new();
    for _ in 0..3 {
        network.push_reservation_error(NetworkError::RetryableClient("stale".into()));
    }
    let signer = MockSigner::new(CALLER);
    let options = OrchestratorOptions {
        max_client_resets: 2,
        ..OrchestratorOptions::default()
    };

    let err = orchestrator(&network, options)
        .upload(
            ad_png(),
            RetentionPeriod::from_days(1),
            CALLER,
            &signer,
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        UploadError::RetryableClient {
            attempts: 2,
            message: "stale".into()
        }
    );
    assert_eq!(network.reset_count(), 2);
    assert_eq!(signer.sign_count(), 0);
}

#[tokio::test]
async fn test_byte_encoded_reservation_is_decoded_before_signing() {
    let network = MockStorageNetwork::new().with_reservation_bytes();
    let signer = MockSigner::new(CALLER);

    orchestrator(&network, OrchestratorOptions::default())
        .upload(
            ad_png(),
            RetentionPeriod::from_seconds(90_000),
            CALLER,
            &signer,
            &ProgressSink::disabled(),
        )
        .await
        .unwrap();

    let reservation = &signer.requests()[0];
    assert_eq!(reservation.shape, TransactionShape::RawBytes);
    assert_eq!(reservation.object_sender.as_deref(), Some(CALLER));
    assert!(reservation.wrapped);
    assert_eq!(network.reservations()[0].epochs, 2);
}

#[tokio::test]
async fn test_other_storage_errors_are_not_retried() {
    let network = MockStorageNetwork::new();
    network.push_reservation_error(NetworkError::Rejected("insufficient WAL".into()));
    let signer = MockSigner::new(CALLER);

    let err = orchestrator(&network, OrchestratorOptions::default())
        .upload(
            ad_png(),
            RetentionPeriod::from_days(1),
            CALLER,
            &signer,
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();

    assert_eq!(err, UploadError::Storage("insufficient WAL".into()));
    assert_eq!(network.reset_count(), 0);
}

#[tokio::test]
async fn test_capability_must_sign_as_caller() {
    let network = MockStorageNetwork::new();
    let signer = MockSigner::new("0xwallet");

    let err = orchestrator(&network, OrchestratorOptions::default())
        .upload(
            ad_png(),
            RetentionPeriod::from_days(1),
            "0xcaller",
            &signer,
            &ProgressSink::disabled(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Validation(_)));
    assert_eq!(signer.sign_count(), 0);
    assert!(network.reservations().is_empty());
    assert_eq!(network.write_count(), 0);
}

#[tokio::test]
async fn test_panicking_progress_callback_does_not_abort_upload() {
    let network = MockStorageNetwork::new();
    let signer = MockSigner::new(CALLER);
    let progress = ProgressSink::from_fn(|update| {
        if update.stage == UploadStage::Uploading {
            panic!("observer crashed at {}%", update.percent);
        }
    });

    let descriptor = orchestrator(&network, OrchestratorOptions::default())
        .upload(ad_png(), RetentionPeriod::from_days(1), CALLER, &signer, &progress)
        .await
        .expect("upload should survive a failing observer");

    assert_eq!(descriptor.url, "https://agg.test/mock-object");
    assert_eq!(
        progress.current(),
        UploadProgress::new(UploadStage::Completed, 100)
    );
}

#[tokio::test]
async fn test_dropped_progress_receiver_does_not_abort_upload() {
    let network = MockStorageNetwork::new();
    let signer = MockSigner::new(CALLER);
    let (progress, rx) = progress_channel();
    drop(rx);

    let descriptor = orchestrator(&network, OrchestratorOptions::default())
        .upload(ad_png(), RetentionPeriod::from_days(1), CALLER, &signer, &progress)
        .await
        .expect("upload should not depend on a listener");

    assert_eq!(descriptor.blob_id.as_deref(), Some("mock-blob"));
    assert_eq!(
        progress.current(),
        UploadProgress::new(UploadStage::Completed, 100)
    );
}
