//! Supplier personal-cabinet (ELACT) operations.
//!
//! Listing and retrieval of electronic-acceptance documents on behalf of a
//! supplier. Every call is authorized by a `usertoken` header the caller
//! obtains elsewhere; this layer only passes it through. Parameter objects
//! arrive validated upstream and are reordered here against the static
//! schema table before serialization.
//!
//! The cabinet responds on the operation element directly (no `dataInfo`
//! nesting); a response without a recognizable operation payload is an
//! error, not an empty result.

use serde_json::{json, Value};
use tracing::debug;
use types::SignedPacket;

use gateway_config::EndpointConfig;

use crate::client::{CallOptions, SoapClient};
use crate::docs::object_list;
use crate::error::{GatewayError, GatewayResult};

/// One supplier signer with their authority records flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct SignerRecord {
    /// Signer fields as received, minus the authority nesting
    pub signer: Value,
    /// The signer's authority records
    pub authorities: Vec<Value>,
}

/// Supplier profile with the signer nesting flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantInfo {
    /// Participant fields as received, minus `signersInfo`
    pub participant: Value,
    /// Registered signers
    pub signers: Vec<SignerRecord>,
}

/// One acceptance document: metadata plus the normalized signed packet.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    /// Document metadata as received
    pub object_info: Value,
    /// The signed-document packet, when the response carries one
    pub packet: Option<SignedPacket>,
}

/// Client for the supplier personal-cabinet endpoint.
#[derive(Debug, Clone)]
pub struct CabinetClient {
    client: SoapClient,
}

impl CabinetClient {
    /// Client over the configured cabinet endpoint.
    pub fn new(config: &EndpointConfig) -> Self {
        Self {
            client: SoapClient::new(config.endpoint.clone(), config.timeout()),
        }
    }

    /// List the supplier's contracts matching the selection parameters.
    pub async fn get_contracts_list(
        &self,
        params: &Value,
        usertoken: &str,
    ) -> GatewayResult<Vec<Value>> {
        let data = self
            .execute("lkpGetContractsList", params, usertoken)
            .await?;
        let items = data
            .get("contractList")
            .and_then(|list| list.get("contractInfo"));
        Ok(object_list(items).into_iter().cloned().collect())
    }

    /// Fetch the supplier profile with its signers and their authorities.
    pub async fn get_participant_info(
        &self,
        reg_num: &str,
        usertoken: &str,
    ) -> GatewayResult<ParticipantInfo> {
        let data = self
            .execute(
                "lkpGetParticipantInfo",
                &json!({ "regNum": reg_num }),
                usertoken,
            )
            .await?;
        let participant = data
            .get("participantInfo")
            .ok_or(GatewayError::EmptyResponse)?;
        Ok(flatten_participant(participant))
    }

    /// List partially-signed / signed acceptance documents.
    pub async fn get_object_list(
        &self,
        params: &Value,
        usertoken: &str,
    ) -> GatewayResult<Vec<Value>> {
        let data = self.execute("lkpGetObjectList", params, usertoken).await?;
        let items = data
            .get("objectList")
            .and_then(|list| list.get("objectInfo"));
        Ok(object_list(items).into_iter().cloned().collect())
    }

    /// Fetch one acceptance document with its signed packet parsed into
    /// the normalized model.
    pub async fn get_object_info(
        &self,
        params: &Value,
        usertoken: &str,
    ) -> GatewayResult<ObjectInfo> {
        let data = self.execute("lkpGetObjectInfo", params, usertoken).await?;
        let object_info = data
            .get("objectInfo")
            .cloned()
            .ok_or(GatewayError::EmptyResponse)?;
        let packet = match data.get("ФайлПакет") {
            Some(raw) => Some(codec::parse_packet_value(raw)?),
            None => None,
        };
        Ok(ObjectInfo {
            object_info,
            packet,
        })
    }

    async fn execute(
        &self,
        operation: &str,
        params: &Value,
        usertoken: &str,
    ) -> GatewayResult<Value> {
        let ordered = codec::order_parameters(operation, params)?;
        debug!(operation, "cabinet call");
        let options = CallOptions::default()
            .header("Content-Type", "text/xml;charset=windows-1251")
            .header("usertoken", usertoken);
        self.client
            .call(operation, &ordered, options)
            .await?
            .into_data()?
            .ok_or(GatewayError::EmptyResponse)
    }
}

/// Flatten the cabinet's signer nesting: `signersInfo.signerInfo` becomes
/// a list, and each signer's `authoritysInfo.authorityInfo` becomes a
/// list on the record.
pub fn flatten_participant(participant: &Value) -> ParticipantInfo {
    let mut fields = participant.as_object().cloned().unwrap_or_default();
    let signers_info = fields.remove("signersInfo");

    let signers = object_list(
        signers_info
            .as_ref()
            .and_then(|info| info.get("signerInfo")),
    )
    .into_iter()
    .map(|signer| {
        let mut signer_fields = signer.as_object().cloned().unwrap_or_default();
        let authoritys_info = signer_fields.remove("authoritysInfo");
        let authorities = object_list(
            authoritys_info
                .as_ref()
                .and_then(|info| info.get("authorityInfo")),
        )
        .into_iter()
        .cloned()
        .collect();
        SignerRecord {
            signer: Value::Object(signer_fields),
            authorities,
        }
    })
    .collect();

    ParticipantInfo {
        participant: Value::Object(fields),
        signers,
    }
}
