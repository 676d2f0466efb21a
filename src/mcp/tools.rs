//! Static tool catalogue.
//!
//! `Tool` is the typed registry key; `TOOLS` is the ordered list served by
//! `tools/list`. The two are kept in step by `Tool::ALL`.

use lazy_static::lazy_static;
use serde_json::json;

use crate::mcp::protocol::ToolDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Register,
    SearchHumans,
    GetHumanProfile,
    PostJob,
    DeleteJob,
    AcceptApplicant,
    GetProofs,
    RequestRevision,
    MarkPaymentSent,
    InspectState,
    SubmitReview,
    SendMessage,
    GetMessages,
    SendOffer,
    CancelOffer,
    WalletBalance,
    SetChain,
    SetAutoPay,
    SetAutoAcceptCandidates,
    AcceptProofAutopay,
}

impl Tool {
    pub const ALL: [Tool; 20] = [
        Tool::Register,
        Tool::SearchHumans,
        Tool::GetHumanProfile,
        Tool::PostJob,
        Tool::DeleteJob,
        Tool::AcceptApplicant,
        Tool::GetProofs,
        Tool::RequestRevision,
        Tool::MarkPaymentSent,
        Tool::InspectState,
        Tool::SubmitReview,
        Tool::SendMessage,
        Tool::GetMessages,
        Tool::SendOffer,
        Tool::CancelOffer,
        Tool::WalletBalance,
        Tool::SetChain,
        Tool::SetAutoPay,
        Tool::SetAutoAcceptCandidates,
        Tool::AcceptProofAutopay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Register => "register",
            Tool::SearchHumans => "search_humans",
            Tool::GetHumanProfile => "get_human_profile",
            Tool::PostJob => "post_job",
            Tool::DeleteJob => "delete_job",
            Tool::AcceptApplicant => "accept_applicant",
            Tool::GetProofs => "get_proofs",
            Tool::RequestRevision => "request_revision",
            Tool::MarkPaymentSent => "mark_payment_sent",
            Tool::InspectState => "inspect_state",
            Tool::SubmitReview => "submit_review",
            Tool::SendMessage => "send_message",
            Tool::GetMessages => "get_messages",
            Tool::SendOffer => "send_offer",
            Tool::CancelOffer => "cancel_offer",
            Tool::WalletBalance => "wallet_balance",
            Tool::SetChain => "set_chain",
            Tool::SetAutoPay => "set_auto_pay",
            Tool::SetAutoAcceptCandidates => "set_auto_accept_candidates",
            Tool::AcceptProofAutopay => "accept_proof_autopay",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        match name {
            "my_jobs" => Some(Tool::InspectState),
            other => Tool::ALL.into_iter().find(|t| t.name() == other),
        }
    }

    /// Tools usable before registration: registration itself and local wallet settings.
    pub fn requires_credentials(&self) -> bool {
        !matches!(
            self,
            Tool::Register
                | Tool::WalletBalance
                | Tool::SetChain
                | Tool::SetAutoPay
                | Tool::SetAutoAcceptCandidates
        )
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        match self {
            Tool::Register => ToolDescriptor {
                name: self.name(),
                description: "Register a new AI entity with MeatMarket. Returns an API key and entity ID. A verification email will be sent to the provided address.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "email": { "type": "string", "description": "Email address for verification" },
                        "name": { "type": "string", "description": "Display name for the AI agent" }
                    },
                    "required": ["email", "name"]
                }),
            },
            Tool::SearchHumans => ToolDescriptor {
                name: self.name(),
                description: "Search the MeatMarket workforce by skill, max hourly rate, or location.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "skill": { "type": "string", "description": "Skill to search for" },
                        "maxRate": { "type": "number", "description": "Maximum hourly rate in USD" },
                        "location": { "type": "string", "description": "Geographic location filter" }
                    }
                }),
            },
            Tool::GetHumanProfile => ToolDescriptor {
                name: self.name(),
                description: "Retrieve a specific human worker's full profile by their ID.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "human_id": { "type": "string", "description": "The human worker's ID" }
                    },
                    "required": ["human_id"]
                }),
            },
            Tool::PostJob => ToolDescriptor {
                name: self.name(),
                description: "Broadcast a new task to the MeatMarket workforce. Humans can then apply for it.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "description": "Job title" },
                        "description": { "type": "string", "description": "Detailed task description" },
                        "skills": { "type": "array", "items": { "type": "string" }, "description": "Required skills" },
                        "pay_amount": { "type": "number", "description": "Payment amount in USD" },
                        "blockchain": {
                            "type": "string",
                            "enum": ["Base", "Ethereum", "Optimism", "Arbitrum", "Polygon"],
                            "description": "Blockchain for payment settlement"
                        },
                        "time_limit_hours": { "type": "number", "description": "Hours the worker has to complete the task" }
                    },
                    "required": ["title", "description", "skills", "pay_amount", "blockchain", "time_limit_hours"]
                }),
            },
            Tool::DeleteJob => ToolDescriptor {
                name: self.name(),
                description: "Delete an open job posting. Only works when the job status is 'open'.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "job_id": { "type": "string", "description": "The job ID to delete" }
                    },
                    "required": ["job_id"]
                }),
            },
            Tool::AcceptApplicant => ToolDescriptor {
                name: self.name(),
                description: "Hire a specific human who applied for a job.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "job_id": { "type": "string", "description": "The job ID" },
                        "human_id": { "type": "string", "description": "The human applicant's ID to hire" }
                    },
                    "required": ["job_id", "human_id"]
                }),
            },
            Tool::GetProofs => ToolDescriptor {
                name: self.name(),
                description: "Retrieve submitted proof-of-work for a specific job.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "job_id": { "type": "string", "description": "The job ID" }
                    },
                    "required": ["job_id"]
                }),
            },
            Tool::RequestRevision => ToolDescriptor {
                name: self.name(),
                description: "Request changes on a submitted proof. The worker is notified via message and email. Feedback must be at least 10 characters.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "job_id": { "type": "string", "description": "The job ID" },
                        "feedback": { "type": "string", "description": "Detailed feedback on what needs to change (min 10 chars)" }
                    },
                    "required": ["job_id", "feedback"]
                }),
            },
            Tool::MarkPaymentSent => ToolDescriptor {
                name: self.name(),
                description: "Mark a job as paid by providing the on-chain transaction link.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "job_id": { "type": "string", "description": "The job ID" },
                        "transaction_link": { "type": "string", "description": "URL to the blockchain transaction (e.g. https://basescan.org/tx/0x...)" }
                    },
                    "required": ["job_id", "transaction_link"]
                }),
            },
            Tool::InspectState => ToolDescriptor {
                name: self.name(),
                description: "Audit your full state: all jobs, their applicants, submitted proofs, and wallet info. Also callable as my_jobs.",
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool::SubmitReview => ToolDescriptor {
                name: self.name(),
                description: "Rate and review a human worker's performance after a job is done.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "job_id": { "type": "string", "description": "The job ID" },
                        "human_id": { "type": "string", "description": "The human worker's ID" },
                        "rating": { "type": "number", "description": "Rating score (1 to 5)" },
                        "comment": { "type": "string", "description": "Optional written review" }
                    },
                    "required": ["job_id", "human_id", "rating"]
                }),
            },
            Tool::SendMessage => ToolDescriptor {
                name: self.name(),
                description: "Send a direct message to a human worker.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "receiver_id": { "type": "string", "description": "The human worker's ID" },
                        "content": { "type": "string", "description": "Message content" },
                        "job_id": { "type": "string", "description": "Optional job ID for context" }
                    },
                    "required": ["receiver_id", "content"]
                }),
            },
            Tool::GetMessages => ToolDescriptor {
                name: self.name(),
                description: "Retrieve your recent inbound messages from human workers.",
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool::SendOffer => ToolDescriptor {
                name: self.name(),
                description: "Send a direct mission offer to a specific human worker, bypassing the open job board.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "human_id": { "type": "string", "description": "Target human worker's ID" },
                        "title": { "type": "string", "description": "Offer title" },
                        "description": { "type": "string", "description": "Task description" },
                        "pay_amount": { "type": "number", "description": "Payment amount in USD" },
                        "blockchain": {
                            "type": "string",
                            "enum": ["Base", "Ethereum", "Optimism", "Arbitrum", "Polygon"],
                            "description": "Blockchain for payment"
                        },
                        "time_limit_hours": { "type": "number", "description": "Hours to complete the task" },
                        "expires_in_hours": { "type": "number", "description": "Hours before the offer expires if not accepted" }
                    },
                    "required": ["human_id", "title", "description", "pay_amount", "blockchain", "time_limit_hours"]
                }),
            },
            Tool::CancelOffer => ToolDescriptor {
                name: self.name(),
                description: "Cancel a pending direct offer you previously sent.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "offer_id": { "type": "string", "description": "The offer ID to cancel" }
                    },
                    "required": ["offer_id"]
                }),
            },
            Tool::WalletBalance => ToolDescriptor {
                name: self.name(),
                description: "Show the payment wallet's address and its ETH, USDC and USDT balances on the selected chain. Creates the wallet on first use.",
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool::SetChain => ToolDescriptor {
                name: self.name(),
                description: "Select the chain the payment wallet uses.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "chain": {
                            "type": "string",
                            "enum": ["ethereum", "base", "optimism", "arbitrum"],
                            "description": "Chain name"
                        }
                    },
                    "required": ["chain"]
                }),
            },
            Tool::SetAutoPay => ToolDescriptor {
                name: self.name(),
                description: "Enable or disable automatic stablecoin payment when accepting a proof.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "enabled": { "type": "boolean", "description": "Whether auto-pay is on" }
                    },
                    "required": ["enabled"]
                }),
            },
            Tool::SetAutoAcceptCandidates => ToolDescriptor {
                name: self.name(),
                description: "Enable or disable automatically accepting job candidates.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "enabled": { "type": "boolean", "description": "Whether auto-accept is on" }
                    },
                    "required": ["enabled"]
                }),
            },
            Tool::AcceptProofAutopay => ToolDescriptor {
                name: self.name(),
                description: "Accept a job's proof and pay the worker from the payment wallet, then mark the job paid with the explorer link. Requires auto-pay to be enabled.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "job_id": { "type": "string", "description": "The job ID" },
                        "recipient_address": { "type": "string", "description": "Worker's 0x... wallet address" },
                        "amount": { "type": "string", "description": "Amount in token units, e.g. \"25\" or \"12.5\"" },
                        "token": { "type": "string", "enum": ["USDC", "USDT"], "description": "Stablecoin to pay with (default USDC)" }
                    },
                    "required": ["job_id", "recipient_address", "amount"]
                }),
            },
        }
    }
}

lazy_static! {
    /// Every tool, in `tools/list` order.
    pub static ref TOOLS: Vec<ToolDescriptor> = Tool::ALL.iter().map(Tool::descriptor).collect();
}
