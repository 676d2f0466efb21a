//! Tool dispatch.
//!
//! Each tool is a direct translation from its arguments to one REST call or one
//! wallet operation. The outcome keeps the HTTP-style status so the handler can
//! set `isError` without interpreting the body.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::blockchain::{
    chains::Chain,
    models::{remediation, WalletError},
};
use crate::marketplace::{ApiError, ApiResponse, ResponseBody};
use crate::mcp::{protocol::ToolResult, session::Session, tools::Tool};
use crate::utils::{arg_bool, arg_str, filter_arg, pick, segment};
use crate::AppState;

pub const NO_CREDENTIALS_MSG: &str =
    "MeatMarket is not set up yet. Run /meatmarket-initialize first to register and save your API credentials.";

const DEFAULT_PAY_TOKEN: &str = "USDC";

/// What a tool produced, before it is wrapped into a `tools/call` result.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub status: u16,
    pub body: ResponseBody,
    /// Set for structured wallet failures that still carry status 200.
    pub failed: bool,
}

impl ToolOutcome {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
            failed: false,
        }
    }

    pub fn wallet_failure(body: Value) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Json(body),
            failed: true,
        }
    }

    pub fn not_initialized() -> Self {
        Self::json(401, json!({ "error": NO_CREDENTIALS_MSG }))
    }

    pub fn is_error(&self) -> bool {
        self.failed || self.status >= 400
    }

    pub fn into_result(self) -> ToolResult {
        let is_error = self.is_error();
        ToolResult::text(self.body.render(), is_error)
    }
}

impl From<ApiResponse> for ToolOutcome {
    fn from(resp: ApiResponse) -> Self {
        Self {
            status: resp.status,
            body: resp.body,
            failed: false,
        }
    }
}

/// Runs one tool. Only transport failures towards the marketplace are errors;
/// everything else, including remote 4xx/5xx, is an outcome.
pub async fn call_tool(
    tool: Tool,
    args: &Value,
    session: &mut Session,
    state: &AppState,
) -> Result<ToolOutcome, ApiError> {
    if tool.requires_credentials() && !session.has_credentials() {
        return Ok(ToolOutcome::not_initialized());
    }

    let api = &state.marketplace;
    let key = session.api_key().map(str::to_owned);
    let key = key.as_deref();

    let resp = match tool {
        Tool::Register => return register(args, session, state).await,
        Tool::SearchHumans => {
            let query: Vec<(&str, String)> = ["skill", "maxRate", "location"]
                .into_iter()
                .filter_map(|k| filter_arg(args, k).map(|v| (k, v)))
                .collect();
            let url = api.endpoint_with_query(&["humans", "search"], &query);
            api.request(Method::GET, url, key, None).await?
        }
        Tool::GetHumanProfile => {
            let url = api.endpoint(&["humans", &segment(args, "human_id")]);
            api.request(Method::GET, url, key, None).await?
        }
        Tool::PostJob => {
            api.request(Method::POST, api.endpoint(&["jobs"]), key, Some(args))
                .await?
        }
        Tool::DeleteJob => {
            let url = api.endpoint(&["jobs", &segment(args, "job_id")]);
            api.request(Method::DELETE, url, key, None).await?
        }
        Tool::AcceptApplicant => {
            let url = api.endpoint(&["jobs", &segment(args, "job_id")]);
            let mut body = pick(args, &["human_id"]);
            body["status"] = json!("active");
            api.request(Method::PATCH, url, key, Some(&body)).await?
        }
        Tool::GetProofs => {
            let url = api.endpoint(&["jobs", &segment(args, "job_id"), "proofs"]);
            api.request(Method::GET, url, key, None).await?
        }
        Tool::RequestRevision => {
            let url = api.endpoint(&["jobs", &segment(args, "job_id"), "request-revision"]);
            let body = pick(args, &["feedback"]);
            api.request(Method::POST, url, key, Some(&body)).await?
        }
        Tool::MarkPaymentSent => {
            let url = api.endpoint(&["jobs", &segment(args, "job_id")]);
            let mut body = pick(args, &["transaction_link"]);
            body["status"] = json!("payment_sent");
            api.request(Method::PATCH, url, key, Some(&body)).await?
        }
        Tool::InspectState => {
            api.request(Method::GET, api.endpoint(&["inspect"]), key, None)
                .await?
        }
        Tool::SubmitReview => {
            let mut body = pick(args, &["job_id", "rating"]);
            if let Some(human) = args.get("human_id").filter(|v| !v.is_null()) {
                body["reviewee_id"] = human.clone();
            }
            body["reviewer_id"] = json!(session.agent_id().unwrap_or_default());
            body["comment"] = json!(arg_str(args, "comment").unwrap_or_default());
            api.request(Method::POST, api.endpoint(&["reviews"]), key, Some(&body))
                .await?
        }
        Tool::SendMessage => {
            let body = pick(args, &["receiver_id", "content", "job_id"]);
            api.request(Method::POST, api.endpoint(&["messages"]), key, Some(&body))
                .await?
        }
        Tool::GetMessages => {
            api.request(Method::GET, api.endpoint(&["messages"]), key, None)
                .await?
        }
        Tool::SendOffer => {
            api.request(Method::POST, api.endpoint(&["offers"]), key, Some(args))
                .await?
        }
        Tool::CancelOffer => {
            let url = api.endpoint(&["offers", &segment(args, "offer_id")]);
            let body = json!({ "status": "canceled" });
            api.request(Method::PATCH, url, key, Some(&body)).await?
        }
        Tool::WalletBalance => return Ok(wallet_balance(session, state).await),
        Tool::SetChain => return Ok(set_chain(args, session)),
        Tool::SetAutoPay => {
            return Ok(set_flag(args, "auto_pay", |s, on| s.set_auto_pay(on), session))
        }
        Tool::SetAutoAcceptCandidates => {
            return Ok(set_flag(
                args,
                "auto_accept_candidates",
                |s, on| s.set_auto_accept_candidates(on),
                session,
            ))
        }
        Tool::AcceptProofAutopay => return accept_proof_autopay(args, session, state).await,
    };

    Ok(resp.into())
}

async fn register(
    args: &Value,
    session: &mut Session,
    state: &AppState,
) -> Result<ToolOutcome, ApiError> {
    let api = &state.marketplace;
    let body = pick(args, &["email", "name"]);
    let mut resp = api
        .request(Method::POST, api.endpoint(&["register"]), session.api_key(), Some(&body))
        .await?;

    if resp.is_error() {
        return Ok(resp.into());
    }
    let issued = resp.body.as_json().and_then(|b| {
        let key = b.get("api_key")?.as_str()?.to_string();
        let ai_id = b.get("ai_id").and_then(Value::as_str).unwrap_or_default().to_string();
        Some((key, ai_id))
    });
    let Some((api_key, ai_id)) = issued else {
        return Ok(resp.into());
    };

    session.set_credentials(api_key, ai_id);
    info!("Registered with MeatMarket");

    match state.wallet_manager.ensure_wallet(session) {
        Ok(wallet) if wallet.created => {
            if let ResponseBody::Json(Value::Object(map)) = &mut resp.body {
                map.insert("wallet_address".into(), Value::String(wallet.address));
            }
        }
        Ok(_) => {}
        Err(e) => warn!("Registered, but could not provision a wallet: {}", e),
    }
    Ok(resp.into())
}

fn settings(session: &Session) -> Value {
    json!({
        "chain": session.chain(),
        "auto_pay": session.auto_pay(),
        "auto_accept_candidates": session.auto_accept_candidates(),
    })
}

async fn wallet_balance(session: &mut Session, state: &AppState) -> ToolOutcome {
    let ensured = match state.wallet_manager.ensure_wallet(session) {
        Ok(w) => w,
        Err(e) => return ToolOutcome::json(500, json!({ "error": e.to_string() })),
    };
    match state.wallet_manager.balances(session).await {
        Ok(report) => {
            let mut body = json!(report);
            body["created"] = json!(ensured.created);
            body["settings"] = settings(session);
            ToolOutcome::json(200, body)
        }
        Err(e) => wallet_error_outcome(e, session),
    }
}

fn set_chain(args: &Value, session: &mut Session) -> ToolOutcome {
    let requested = arg_str(args, "chain").unwrap_or_default();
    match Chain::parse(&requested) {
        Some(chain) => {
            session.set_chain(chain);
            info!("Payment chain set to {}", chain);
            ToolOutcome::json(
                200,
                json!({
                    "success": true,
                    "chain": chain,
                    "chain_id": chain.info().chain_id,
                    "explorer": chain.info().explorer_url,
                }),
            )
        }
        None => ToolOutcome::json(
            400,
            json!({
                "error": format!("Unsupported chain '{}'", requested),
                "supported": Chain::supported_names(),
                "chain": session.chain(),
            }),
        ),
    }
}

fn set_flag(
    args: &Value,
    name: &str,
    apply: impl FnOnce(&mut Session, bool),
    session: &mut Session,
) -> ToolOutcome {
    match arg_bool(args, "enabled") {
        Some(on) => {
            apply(session, on);
            info!("{} set to {}", name, on);
            let mut body = json!({ "success": true });
            body[name] = json!(on);
            ToolOutcome::json(200, body)
        }
        None => ToolOutcome::json(400, json!({ "error": "'enabled' must be true or false" })),
    }
}

/// Structured body and status for a wallet failure.
fn wallet_error_outcome(err: WalletError, session: &Session) -> ToolOutcome {
    let address = session.wallet().map(|w| w.address());
    let mut body = remediation(&err, session.chain(), address);
    body["success"] = json!(false);
    body["error"] = json!(err.to_string());

    let status = match &err {
        WalletError::NoWallet => return ToolOutcome::wallet_failure(body),
        WalletError::InsufficientBalance {
            token,
            balance,
            required,
        } => {
            body["token"] = json!(token);
            body["balance"] = json!(balance);
            body["required"] = json!(required);
            402
        }
        WalletError::UnsupportedToken { .. }
        | WalletError::InvalidAmount(_)
        | WalletError::InvalidAddress(_) => 400,
        WalletError::Rpc(_) => 502,
        WalletError::Unconfirmed { tx_hash, reason } => {
            body["pending"] = json!(true);
            body["tx_hash"] = json!(tx_hash);
            body["tx_link"] = json!(session.chain().tx_link(tx_hash));
            body["diagnosis"] = json!(reason);
            504
        }
        WalletError::InvalidKey(_) | WalletError::Broadcast(_) | WalletError::Reverted(_) => {
            if err.is_gas_shortfall() {
                body["diagnosis"] = json!("insufficient gas funds");
            }
            500
        }
    };
    ToolOutcome::json(status, body)
}

async fn accept_proof_autopay(
    args: &Value,
    session: &mut Session,
    state: &AppState,
) -> Result<ToolOutcome, ApiError> {
    if session.wallet().is_none() {
        return Ok(wallet_error_outcome(WalletError::NoWallet, session));
    }
    if !session.auto_pay() {
        return Ok(ToolOutcome::wallet_failure(json!({
            "success": false,
            "error": "Auto-pay is disabled",
            "advice": "Enable it with set_auto_pay, or pay manually and call mark_payment_sent.",
        })));
    }

    let job_id = segment(args, "job_id");
    let token = arg_str(args, "token").unwrap_or_else(|| DEFAULT_PAY_TOKEN.to_string());
    let recipient = arg_str(args, "recipient_address").unwrap_or_default();
    let amount = arg_str(args, "amount").unwrap_or_default();

    let receipt = match state
        .wallet_manager
        .transfer(session, &token, &recipient, &amount)
        .await
    {
        Ok(receipt) => receipt,
        Err(e) => {
            let mut outcome = wallet_error_outcome(e, session);
            if let ResponseBody::Json(body) = &mut outcome.body {
                body["job_id"] = json!(job_id);
            }
            return Ok(outcome);
        }
    };

    // The payment is final from here on; a failed job update is reported, not raised.
    let api = &state.marketplace;
    let update_body = json!({ "status": "payment_sent", "transaction_link": receipt.tx_link });
    let job_update = api
        .request(
            Method::PATCH,
            api.endpoint(&["jobs", &job_id]),
            session.api_key(),
            Some(&update_body),
        )
        .await;
    let (job_update, update_failed) = match job_update {
        Ok(resp) => {
            let failed = resp.is_error();
            let body = match resp.body {
                ResponseBody::Json(v) => v,
                ResponseBody::Text(t) => Value::String(t),
            };
            (json!({ "status": resp.status, "body": body }), failed)
        }
        Err(e) => (json!({ "error": e.to_string() }), true),
    };
    if update_failed {
        warn!("Paid job {} but could not mark it paid", job_id);
    }

    let mut body = json!(receipt);
    body["success"] = json!(true);
    body["job_id"] = json!(job_id);
    body["job_update"] = job_update;
    if update_failed {
        body["advice"] = json!("Payment went through. Call mark_payment_sent with the tx_link to record it.");
    }
    Ok(ToolOutcome {
        status: 200,
        body: ResponseBody::Json(body),
        failed: update_failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::credentials::{StateDocument, StateStore};

    fn session() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("credentials.json"));
        (dir, Session::from_document(store, StateDocument::default()))
    }

    #[test]
    fn text_bodies_pass_through_and_status_sets_the_flag() {
        let outcome = ToolOutcome::from(ApiResponse {
            status: 503,
            body: ResponseBody::Text("upstream down".into()),
        });
        let result = outcome.into_result();
        assert!(result.is_error);
        assert_eq!(serde_json::to_value(&result).unwrap()["content"][0]["text"], json!("upstream down"));
    }

    #[test]
    fn structured_failures_flag_errors_at_status_200() {
        let outcome = ToolOutcome::wallet_failure(json!({"success": false}));
        assert_eq!(outcome.status, 200);
        assert!(outcome.is_error());
        assert!(!ToolOutcome::json(200, json!({})).is_error());
    }

    #[test]
    fn wallet_errors_map_to_statuses() {
        let (_dir, s) = session();
        let short = WalletError::InsufficientBalance {
            token: "USDC".into(),
            balance: "1".into(),
            required: "2".into(),
        };
        assert_eq!(wallet_error_outcome(short, &s).status, 402);
        assert_eq!(wallet_error_outcome(WalletError::Rpc("timeout".into()), &s).status, 502);
        assert_eq!(wallet_error_outcome(WalletError::InvalidAmount("x".into()), &s).status, 400);

        let gas = wallet_error_outcome(WalletError::Broadcast("insufficient funds".into()), &s);
        assert_eq!(gas.status, 500);
        assert_eq!(gas.body.as_json().unwrap()["diagnosis"], json!("insufficient gas funds"));

        let none = wallet_error_outcome(WalletError::NoWallet, &s);
        assert_eq!(none.status, 200);
        assert!(none.failed);
    }

    #[test]
    fn unconfirmed_transfer_is_a_gateway_timeout_with_the_hash() {
        let (_dir, s) = session();
        let out = wallet_error_outcome(
            WalletError::Unconfirmed {
                tx_hash: "0xbeef".into(),
                reason: "dropped from the mempool".into(),
            },
            &s,
        );
        assert_eq!(out.status, 504);
        let body = out.body.as_json().unwrap();
        assert_eq!(body["pending"], json!(true));
        assert_eq!(body["tx_link"], json!("https://basescan.org/tx/0xbeef"));
        assert_eq!(body["diagnosis"], json!("dropped from the mempool"));
    }
}
