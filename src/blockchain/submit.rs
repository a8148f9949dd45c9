//! Signing and submission of a call chain as one transaction.
//!
//! # Data Flow
//! ```text
//! CallChain
//!     → lower()                      (no network; build errors stop here)
//!     → sui_multiGetObjects          (object refs / shared versions)
//!     → suix_getReferenceGasPrice
//!     → suix_getCoins                (gas payment)
//!     → BCS TransactionData → sign
//!     → sui_executeTransactionBlock  → SubmissionReceipt
//! ```

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::blockchain::client::RpcClient;
use crate::blockchain::network::EndpointSet;
use crate::blockchain::transaction::{CallChain, InputSlot};
use crate::blockchain::types::{Address, ObjectId, SubmissionError, SubmissionResult};
use crate::blockchain::wallet::SigningIdentity;
use crate::blockchain::wire::{
    CallArg, GasData, ObjectArg, ObjectDigest, ObjectRef, ProgrammableTransaction,
    TransactionData, TransactionDataV1, TransactionExpiration, TransactionKind,
};
use crate::observability::metrics;

/// Coin type used to pay for gas.
pub const GAS_COIN_TYPE: &str = "0x2::sui::SUI";

/// Most coins a transaction may use for gas payment.
pub const MAX_GAS_OBJECTS: usize = 256;

/// Which parts of the execution result the ledger should report back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub show_input: bool,
    pub show_effects: bool,
    pub show_events: bool,
    pub show_object_changes: bool,
    pub show_balance_changes: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_input: true,
            show_effects: true,
            show_events: true,
            show_object_changes: true,
            show_balance_changes: true,
        }
    }
}

impl ReportOptions {
    fn to_rpc(self) -> Value {
        json!({
            "showInput": self.show_input,
            "showEffects": self.show_effects,
            "showEvents": self.show_events,
            "showObjectChanges": self.show_object_changes,
            "showBalanceChanges": self.show_balance_changes,
        })
    }
}

/// Execution result as reported by the ledger.
///
/// Section contents follow the ledger's JSON schema and are kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_changes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_changes: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl SubmissionReceipt {
    /// Status from the effects section; `None` when the ledger sent none.
    pub fn execution_status(&self) -> Option<ExecutionStatus> {
        let status = self.effects.as_ref()?.get("status")?;
        match status.get("status")?.as_str()? {
            "success" => Some(ExecutionStatus::Success),
            _ => Some(ExecutionStatus::Failure {
                error: status
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown execution failure")
                    .to_string(),
            }),
        }
    }
}

/// How an input object is referenced once its ownership is known.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvedObject {
    Shared { initial_shared_version: u64 },
    Owned(ObjectRef),
}

#[derive(Deserialize)]
struct ObjectResponse {
    #[serde(default)]
    data: Option<ObjectData>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectData {
    #[serde(deserialize_with = "lenient_u64")]
    version: u64,
    digest: String,
    #[serde(default)]
    owner: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<GasCoin>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasCoin {
    coin_object_id: ObjectId,
    #[serde(deserialize_with = "lenient_u64")]
    version: u64,
    digest: String,
    #[serde(deserialize_with = "lenient_u64")]
    balance: u64,
}

/// The RPC encodes 64-bit integers as strings; accept numbers too.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("{} is not a u64", n))),
        Value::String(s) => s.parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected integer, got {}",
            other
        ))),
    }
}

/// Signs and submits call chains to one network.
#[derive(Debug, Clone)]
pub struct Submitter {
    client: RpcClient,
    gas_budget: u64,
}

impl Submitter {
    pub fn new(
        endpoints: &EndpointSet,
        request_timeout: Duration,
        gas_budget: u64,
    ) -> SubmissionResult<Self> {
        let client = RpcClient::new(endpoints.rpc_url.clone(), request_timeout)?;
        Ok(Self { client, gas_budget })
    }

    /// Submit the whole chain as one atomic transaction.
    ///
    /// Either a receipt is returned or nothing reached the ledger's state;
    /// there are no retries.
    pub async fn submit(
        &self,
        chain: &CallChain,
        identity: &SigningIdentity,
        options: &ReportOptions,
    ) -> SubmissionResult<SubmissionReceipt> {
        let result = self.sign_and_execute(chain, identity, options).await;
        metrics::record_submission(match &result {
            Ok(_) => "success",
            Err(SubmissionError::RemoteRejection { .. }) => "rejected",
            Err(_) => "failed",
        });
        result
    }

    async fn sign_and_execute(
        &self,
        chain: &CallChain,
        identity: &SigningIdentity,
        options: &ReportOptions,
    ) -> SubmissionResult<SubmissionReceipt> {
        let lowered = chain.lower()?;
        let sender = identity.address();

        tracing::info!(
            sender = %sender,
            steps = chain.len(),
            commands = lowered.commands.len(),
            inputs = lowered.inputs.len(),
            rpc_url = %self.client.url(),
            "Preparing transaction"
        );

        let resolved = self.resolve_objects(&lowered.object_ids()).await?;
        let inputs = lowered
            .inputs
            .into_iter()
            .map(|slot| to_call_arg(slot, &resolved))
            .collect::<SubmissionResult<Vec<_>>>()?;

        let price = self.reference_gas_price().await?;
        let payment = self.gas_payment(sender).await?;

        let data = TransactionData::V1(TransactionDataV1 {
            kind: TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
                inputs,
                commands: lowered.commands,
            }),
            sender,
            gas_data: GasData {
                payment,
                owner: sender,
                price,
                budget: self.gas_budget,
            },
            expiration: TransactionExpiration::None,
        });
        let tx_bytes = data
            .to_bytes()
            .map_err(|e| SubmissionError::Encoding(e.to_string()))?;
        let signature = identity.sign_transaction(&tx_bytes);

        // Effects carry the abort status, so they are always requested.
        let requested = ReportOptions {
            show_effects: true,
            ..*options
        };
        let mut receipt: SubmissionReceipt = self
            .client
            .call(
                "sui_executeTransactionBlock",
                json!([
                    general_purpose::STANDARD.encode(&tx_bytes),
                    [signature],
                    requested.to_rpc(),
                    "WaitForLocalExecution",
                ]),
            )
            .await?;

        match receipt.execution_status() {
            Some(ExecutionStatus::Failure { error }) => {
                tracing::error!(digest = %receipt.digest, error = %error, "Transaction aborted");
                return Err(SubmissionError::RemoteRejection {
                    raw_reason: error,
                    digest: Some(receipt.digest),
                });
            }
            Some(ExecutionStatus::Success) => {}
            None => tracing::warn!(digest = %receipt.digest, "Ledger reported no execution status"),
        }

        if !options.show_effects {
            receipt.effects = None;
        }

        tracing::info!(digest = %receipt.digest, "Transaction executed");
        Ok(receipt)
    }

    async fn resolve_objects(
        &self,
        ids: &[ObjectId],
    ) -> SubmissionResult<HashMap<ObjectId, ResolvedObject>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let responses: Vec<ObjectResponse> = self
            .client
            .call("sui_multiGetObjects", json!([ids, { "showOwner": true }]))
            .await?;
        if responses.len() != ids.len() {
            return Err(SubmissionError::network(format!(
                "sui_multiGetObjects returned {} entries for {} ids",
                responses.len(),
                ids.len()
            )));
        }

        ids.iter()
            .zip(responses)
            .map(|(id, response)| Ok((*id, resolve_object(*id, response)?)))
            .collect()
    }

    async fn reference_gas_price(&self) -> SubmissionResult<u64> {
        #[derive(Deserialize)]
        struct Price(#[serde(deserialize_with = "lenient_u64")] u64);

        let Price(price) = self
            .client
            .call("suix_getReferenceGasPrice", json!([]))
            .await?;
        tracing::debug!(price, "Reference gas price");
        Ok(price)
    }

    async fn gas_payment(&self, owner: Address) -> SubmissionResult<Vec<ObjectRef>> {
        let mut coins: Vec<GasCoin> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page: CoinPage = self
                .client
                .call("suix_getCoins", json!([owner, GAS_COIN_TYPE, cursor, null]))
                .await?;
            coins.extend(page.data);

            let total: u128 = coins.iter().map(|coin| coin.balance as u128).sum();
            if total >= self.gas_budget as u128 || !page.has_next_page {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        select_gas_coins(coins, self.gas_budget)
    }
}

fn resolve_object(id: ObjectId, response: ObjectResponse) -> SubmissionResult<ResolvedObject> {
    let unresolved = |reason: String| SubmissionError::ObjectResolution {
        object_id: id,
        reason,
    };

    if let Some(error) = response.error {
        return Err(unresolved(error.to_string()));
    }
    let data = response
        .data
        .ok_or_else(|| unresolved("no object data returned".to_string()))?;

    let shared_version = data
        .owner
        .as_ref()
        .and_then(|owner| owner.get("Shared"))
        .map(|shared| {
            shared
                .get("initial_shared_version")
                .and_then(|v| v.as_u64().or_else(|| v.as_str()?.parse().ok()))
                .ok_or_else(|| unresolved("shared object without initial version".to_string()))
        })
        .transpose()?;

    match shared_version {
        Some(initial_shared_version) => Ok(ResolvedObject::Shared {
            initial_shared_version,
        }),
        None => {
            let digest = ObjectDigest::from_base58(&data.digest).map_err(unresolved)?;
            Ok(ResolvedObject::Owned((id, data.version, digest)))
        }
    }
}

fn to_call_arg(
    slot: InputSlot,
    resolved: &HashMap<ObjectId, ResolvedObject>,
) -> SubmissionResult<CallArg> {
    match slot {
        InputSlot::Pure(bytes) => Ok(CallArg::Pure(bytes)),
        InputSlot::Object { id, mutable } => match resolved.get(&id) {
            Some(ResolvedObject::Shared {
                initial_shared_version,
            }) => Ok(CallArg::Object(ObjectArg::SharedObject {
                id,
                initial_shared_version: *initial_shared_version,
                mutable,
            })),
            Some(ResolvedObject::Owned(object_ref)) => {
                Ok(CallArg::Object(ObjectArg::ImmOrOwnedObject(object_ref.clone())))
            }
            None => Err(SubmissionError::ObjectResolution {
                object_id: id,
                reason: "object was not resolved".to_string(),
            }),
        },
    }
}

/// Pick the largest coins until `budget` is covered.
fn select_gas_coins(mut coins: Vec<GasCoin>, budget: u64) -> SubmissionResult<Vec<ObjectRef>> {
    coins.sort_by(|a, b| b.balance.cmp(&a.balance));

    let mut selected = Vec::new();
    let mut covered: u64 = 0;
    for coin in coins.into_iter().take(MAX_GAS_OBJECTS) {
        if covered >= budget && !selected.is_empty() {
            break;
        }
        let digest = ObjectDigest::from_base58(&coin.digest).map_err(|reason| {
            SubmissionError::ObjectResolution {
                object_id: coin.coin_object_id,
                reason,
            }
        })?;
        covered = covered.saturating_add(coin.balance);
        selected.push((coin.coin_object_id, coin.version, digest));
    }

    if covered < budget || selected.is_empty() {
        return Err(SubmissionError::InsufficientGas {
            required: budget,
            available: covered,
        });
    }
    Ok(selected)
}
