//! End-to-end pipeline tests: stub ledger client, mock JSON-RPC endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zkid_core::{AccountId, ContractId, ScValue};
use zkid_rpc::{Footprint, RpcConfig, RpcGateway};
use zkid_tx::{
    Account, CancellationToken, Confirmation, ContractCall, ContractErrorTable, Envelope,
    FnSigner, InvocationRequest, LedgerClient, MethodResult, OrchestratorConfig, PipelineWarning,
    PollPolicy, PrepareChain, PrepareTier, SignedPayload, SigningContext, SigningError, Simulation,
    TransactionOrchestrator, TransactionSigner, TransactionState, TxError,
};

const PASSPHRASE: &str = "Test SDF Network ; September 2015";
const ADMIN: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";
const ERRORS: ContractErrorTable =
    ContractErrorTable::new("verifier", &[(2, "EmptyProof"), (5, "NotVerified")]);

fn source() -> AccountId {
    AccountId::parse(&format!("G{}", "S".repeat(55))).unwrap()
}

fn call() -> ContractCall {
    ContractCall::new(
        ContractId::parse(&format!("C{}", "V".repeat(55))).unwrap(),
        "verify_proof",
        vec![ScValue::address(&source()), ScValue::bytes(vec![0u8; 256])],
    )
}

fn commitment_value() -> ScValue {
    ScValue::bytes(vec![0xab; 32])
}

// -- Stub ledger --------------------------------------------------------------

struct StubLedger {
    simulation: Result<Simulation, String>,
    can_assemble: bool,
}

impl StubLedger {
    fn returning(value: ScValue) -> Self {
        Self {
            simulation: Ok(Simulation {
                return_value: Some(value),
                footprint: Some(Footprint {
                    read_only: vec!["vk".into()],
                    read_write: vec![],
                }),
                min_resource_fee: Some(5_000),
                latest_ledger: Some(10),
            }),
            can_assemble: false,
        }
    }

    fn assembling(mut self) -> Self {
        self.can_assemble = true;
        self
    }
}

#[async_trait]
impl LedgerClient for StubLedger {
    async fn load_account(&self, account: &AccountId) -> Result<Account, TxError> {
        Ok(Account {
            id: account.clone(),
            sequence: 41,
        })
    }

    async fn simulate(&self, _envelope: &Envelope) -> Result<Simulation, TxError> {
        self.simulation
            .clone()
            .map_err(|message| TxError::Simulation { message })
    }

    async fn assemble(&self, envelope: &Envelope, simulation: &Simulation) -> Result<Envelope, TxError> {
        if !self.can_assemble {
            return Err(TxError::Preparation("assembler unavailable".into()));
        }
        let mut draft = envelope.decode()?;
        draft.footprint = simulation.footprint.clone();
        draft.resource_fee = simulation.min_resource_fee;
        Envelope::encode(&draft)
    }
}

// -- Helpers ------------------------------------------------------------------

fn fast_poll(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        max_attempts,
    }
}

fn orchestrator(server: &MockServer, ledger: StubLedger, poll: PollPolicy) -> TransactionOrchestrator {
    let gateway = RpcGateway::new(&RpcConfig::local_mock(&server.uri()).unwrap()).unwrap();
    let ledger: Arc<dyn LedgerClient> = Arc::new(ledger);
    let chain = PrepareChain::standard(gateway.clone(), ledger.clone());
    let mut config = OrchestratorConfig::new(PASSPHRASE);
    config.poll = poll;
    TransactionOrchestrator::new(gateway, ledger, chain, config)
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": "1", "result": result}))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"jsonrpc": "2.0", "id": "1", "error": {"code": code, "message": message}}))
}

async fn mount(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": rpc_method})))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Signer that echoes the envelope and records what it was given.
fn recording_signer() -> (impl TransactionSigner, Arc<Mutex<Vec<(Envelope, SigningContext)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let signer = FnSigner(move |env: Envelope, ctx: SigningContext| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push((env.clone(), ctx));
            Ok::<_, SigningError>(SignedPayload::from(env))
        }
    });
    (signer, seen)
}

fn request() -> InvocationRequest {
    InvocationRequest::new(call(), source(), ERRORS)
}

// -- Tests --------------------------------------------------------------------

#[tokio::test]
async fn degraded_preparation_signs_the_built_envelope() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_error(-32601, "method not found")).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "h1"}))).await;
    mount(
        &server,
        "getTransaction",
        rpc_result(json!({"status": "SUCCESS", "returnValue": {"type": "bytes", "value": "ab".repeat(32)}})),
    )
    .await;

    let orch = orchestrator(&server, StubLedger::returning(commitment_value()), fast_poll(5));
    let (signer, seen) = recording_signer();
    let outcome = orch.invoke(request(), &signer).await.unwrap();

    assert_eq!(outcome.prepared_by, PrepareTier::Unprepared);
    assert_eq!(outcome.prepared_envelope, outcome.built_envelope);
    assert_eq!(outcome.submitted_envelope, outcome.built_envelope);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [PipelineWarning::PrepareDegraded { attempted }]
            if attempted == &vec![PrepareTier::RpcPrepare, PrepareTier::LocalAssemble]
    ));
    assert_eq!(outcome.confirmation, Confirmation::Confirmed);
    assert_eq!(outcome.value, MethodResult::Value(commitment_value()));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, outcome.built_envelope);
    assert_eq!(seen[0].1.network_passphrase, PASSPHRASE);
    assert_eq!(seen[0].1.address, source());
}

#[tokio::test]
async fn built_envelope_carries_next_sequence() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_error(-32601, "method not found")).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "h1"}))).await;
    mount(&server, "getTransaction", rpc_result(json!({"status": "SUCCESS"}))).await;

    let orch = orchestrator(&server, StubLedger::returning(commitment_value()), fast_poll(5));
    let (signer, _) = recording_signer();
    let outcome = orch.invoke(request(), &signer).await.unwrap();

    let draft = outcome.built_envelope.decode().unwrap();
    assert_eq!(draft.sequence, 42);
    assert_eq!(draft.network_passphrase, PASSPHRASE);
    assert_eq!(draft.invocation, call());
    // Confirmed without a return value falls back to the simulated one.
    assert_eq!(outcome.value, MethodResult::Value(commitment_value()));
}

#[tokio::test]
async fn endpoint_prepare_is_preferred() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "h1"}))).await;
    mount(&server, "getTransaction", rpc_result(json!({"status": "SUCCESS"}))).await;

    let orch = orchestrator(&server, StubLedger::returning(commitment_value()).assembling(), fast_poll(5));
    let (signer, seen) = recording_signer();
    let outcome = orch.invoke(request(), &signer).await.unwrap();

    assert_eq!(outcome.prepared_by, PrepareTier::RpcPrepare);
    assert_eq!(seen.lock().unwrap()[0].0.as_str(), "PREPARED");
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn local_assembly_attaches_footprint() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_error(-32601, "method not found")).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "h1"}))).await;
    mount(&server, "getTransaction", rpc_result(json!({"status": "SUCCESS"}))).await;

    let orch = orchestrator(&server, StubLedger::returning(commitment_value()).assembling(), fast_poll(5));
    let (signer, _) = recording_signer();
    let outcome = orch.invoke(request(), &signer).await.unwrap();

    assert_eq!(outcome.prepared_by, PrepareTier::LocalAssemble);
    let draft = outcome.prepared_envelope.decode().unwrap();
    assert!(draft.is_assembled());
    assert_eq!(draft.resource_fee, Some(5_000));
}

#[tokio::test]
async fn confirmation_timeout_returns_simulated_value_unconfirmed() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "slow"}))).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "getTransaction", "params": {"hash": "slow"}})))
        .respond_with(rpc_result(json!({"status": "NOT_FOUND"})))
        .expect(3)
        .mount(&server)
        .await;

    let orch = orchestrator(&server, StubLedger::returning(commitment_value()), fast_poll(3));
    let (signer, _) = recording_signer();
    let outcome = orch.invoke(request(), &signer).await.unwrap();

    assert_eq!(outcome.confirmation, Confirmation::Unconfirmed);
    assert!(!outcome.is_confirmed());
    assert_eq!(outcome.value, MethodResult::Value(commitment_value()));
    assert_eq!(outcome.hash.as_deref(), Some("slow"));
    assert_eq!(
        outcome.warnings,
        vec![PipelineWarning::ConfirmationTimeout {
            hash: "slow".into(),
            attempts: 3
        }]
    );
    assert_eq!(
        outcome.transitions.last().map(|t| t.to_state),
        Some(TransactionState::TimedOut)
    );
}

#[tokio::test]
async fn pending_then_success_stops_polling() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "h2"}))).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "getTransaction"})))
        .respond_with(rpc_result(json!({"status": "NOT_FOUND"})))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "getTransaction"})))
        .respond_with(rpc_result(json!({"status": "SUCCESS", "returnValue": {"type": "bool", "value": true}})))
        .expect(1)
        .mount(&server)
        .await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Bool(false)), fast_poll(10));
    let (signer, _) = recording_signer();
    let outcome = orch.invoke(request(), &signer).await.unwrap();

    assert!(outcome.is_confirmed());
    assert_eq!(outcome.value, MethodResult::Value(ScValue::Bool(true)));
    let states: Vec<_> = outcome.transitions.iter().map(|t| t.to_state).collect();
    assert_eq!(
        states,
        vec![
            TransactionState::Simulated,
            TransactionState::Prepared,
            TransactionState::Signed,
            TransactionState::Submitted,
            TransactionState::Confirmed,
        ]
    );
}

#[tokio::test]
async fn missing_cosigner_error_names_the_address() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;
    mount(
        &server,
        "sendTransaction",
        rpc_result(json!({
            "status": "ERROR",
            "errorResult": format!("HostError: Error(Auth, InvalidAction) requires signatures from {ADMIN}")
        })),
    )
    .await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Void), fast_poll(3));
    let (signer, _) = recording_signer();
    let err = orch.invoke(request(), &signer).await.unwrap_err();

    match err {
        TxError::Submission { message, detail, .. } => {
            assert!(message.contains(ADMIN), "message: {message}");
            assert!(message.contains("co-signature"), "message: {message}");
            assert!(detail.unwrap().contains("requires signatures from"));
        }
        other => panic!("expected submission error, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_submission_error_is_reported_verbatim() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;
    mount(
        &server,
        "sendTransaction",
        rpc_result(json!({"status": "ERROR", "errorResult": "txFAILED"})),
    )
    .await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Void), fast_poll(3));
    let (signer, _) = recording_signer();
    let err = orch.invoke(request(), &signer).await.unwrap_err();

    match err {
        TxError::Submission { message, .. } => assert_eq!(message, "txFAILED"),
        other => panic!("expected submission error, got {other:?}"),
    }
}

#[tokio::test]
async fn contract_error_during_simulation_aborts_before_signing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "sendTransaction"})))
        .respond_with(rpc_result(json!({"status": "PENDING", "hash": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let ledger = StubLedger {
        simulation: Err("HostError: Error(Contract, #5)".into()),
        can_assemble: true,
    };
    let orch = orchestrator(&server, ledger, fast_poll(3));
    let (signer, seen) = recording_signer();
    let err = orch.invoke(request(), &signer).await.unwrap_err();

    assert_eq!(err.contract_error_name(), Some("NotVerified"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn err_return_value_is_a_contract_error() {
    let server = MockServer::start().await;
    let orch = orchestrator(&server, StubLedger::returning(ScValue::Err(2)), fast_poll(3));
    let (signer, _) = recording_signer();
    let err = orch.invoke(request(), &signer).await.unwrap_err();
    assert!(matches!(
        err,
        TxError::Contract { contract: "verifier", code: 2, name: "EmptyProof" }
    ));
}

#[tokio::test]
async fn on_chain_failure_is_diagnosed() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "bad"}))).await;
    mount(
        &server,
        "getTransaction",
        rpc_result(json!({"status": "FAILED", "resultMetaXdr": "write outside of the footprint"})),
    )
    .await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Void), fast_poll(3));
    let (signer, _) = recording_signer();
    let err = orch.invoke(request(), &signer).await.unwrap_err();
    match err {
        TxError::Submission { hash, message, .. } => {
            assert_eq!(hash.as_deref(), Some("bad"));
            assert!(message.contains("footprint"));
        }
        other => panic!("expected submission error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_signing_never_submits() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "sendTransaction"})))
        .respond_with(rpc_result(json!({"status": "PENDING", "hash": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Void), fast_poll(3));
    let stuck = FnSigner(|_env: Envelope, _ctx: SigningContext| async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err::<SignedPayload, _>(SigningError::Failed("unreachable".into()))
    });
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let err = orch
        .invoke(request().with_cancellation(token), &stuck)
        .await
        .unwrap_err();
    assert!(matches!(err, TxError::Signing(SigningError::Cancelled)));
}

#[tokio::test]
async fn declined_signature_is_a_signing_error() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Void), fast_poll(3));
    let declining = FnSigner(|_env: Envelope, _ctx: SigningContext| async move {
        Err::<SignedPayload, _>(SigningError::Declined("user rejected".into()))
    });
    let err = orch.invoke(request(), &declining).await.unwrap_err();
    assert!(matches!(err, TxError::Signing(SigningError::Declined(_))));
}

#[tokio::test]
async fn failed_invocation_keeps_its_state_history() {
    let server = MockServer::start().await;
    mount(&server, "prepareTransaction", rpc_result(json!({"transaction": "PREPARED"}))).await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Void), fast_poll(3));
    let declining = FnSigner(|_env: Envelope, _ctx: SigningContext| async move {
        Err::<SignedPayload, _>(SigningError::Declined("user rejected".into()))
    });
    let (result, lifecycle) = orch.invoke_traced(request(), &declining).await;
    assert!(result.is_err());

    let states: Vec<_> = lifecycle.transitions.iter().map(|t| t.to_state).collect();
    assert_eq!(
        states,
        vec![TransactionState::Simulated, TransactionState::Prepared, TransactionState::Failed]
    );
    assert_eq!(lifecycle.state, TransactionState::Failed);
    assert!(lifecycle.transitions[2].reason.contains("user rejected"));
}

#[tokio::test]
async fn simulate_only_never_submits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let orch = orchestrator(&server, StubLedger::returning(ScValue::Bool(true)), fast_poll(3));
    let value = orch.simulate_only(call(), &source(), &ERRORS).await.unwrap();
    assert_eq!(value, MethodResult::Value(ScValue::Bool(true)));
}

#[tokio::test]
async fn rpc_backed_pipeline_runs_end_to_end() {
    let server = MockServer::start().await;
    mount(&server, "getAccount", rpc_result(json!({"id": source().to_string(), "sequence": "99"}))).await;
    mount(
        &server,
        "simulateTransaction",
        rpc_result(json!({
            "retval": {"type": "bool", "value": true},
            "footprint": {"readOnly": [], "readWrite": ["cred"]},
            "minResourceFee": 700
        })),
    )
    .await;
    mount(&server, "prepareTransaction", rpc_error(-32601, "method not found")).await;
    mount(&server, "sendTransaction", rpc_result(json!({"status": "PENDING", "hash": "h9"}))).await;
    mount(&server, "getTransaction", rpc_result(json!({"status": "SUCCESS"}))).await;

    let gateway = RpcGateway::new(&RpcConfig::local_mock(&server.uri()).unwrap()).unwrap();
    let mut config = OrchestratorConfig::new(PASSPHRASE);
    config.poll = fast_poll(3);
    let orch = TransactionOrchestrator::over_rpc(gateway, config);
    let (signer, _) = recording_signer();
    let outcome = orch.invoke(request(), &signer).await.unwrap();

    assert_eq!(outcome.prepared_by, PrepareTier::LocalAssemble);
    let draft = outcome.submitted_envelope.decode().unwrap();
    assert_eq!(draft.sequence, 100);
    assert_eq!(draft.fee, 100 + 700);
    assert_eq!(outcome.value, MethodResult::Value(ScValue::Bool(true)));
}
