//! Payment handshake: requirement selection, authorization, signing.
//!
//! Turns the payment requirements from a 402 response into the signed token
//! carried in the `X-PAYMENT` header of the retried request. One signing
//! attempt per invocation; failures are never retried here.

use chrono::Utc;
use rand::RngCore;
use tracing::{debug, info};

use crate::credential::PaymentCredential;
use crate::error::{X402Error, X402Result};
use crate::types::{
    ExactPaymentDetails, PaymentAuthorization, PaymentPayload, PaymentRequirement,
    SignedPaymentToken,
};

/// Build and sign a payment authorization for the first offered requirement.
///
/// Selection is first-offered-wins: no ranking or negotiation. Fails with
/// `InvalidRequirements` before any signing when the list is empty.
pub fn handshake(
    requirements: &[PaymentRequirement],
    credential: &PaymentCredential,
    version: u32,
) -> X402Result<SignedPaymentToken> {
    let requirement = requirements.first().ok_or_else(|| {
        X402Error::invalid_requirements("402 response carried an empty payment_requirements list")
    })?;

    let payer = credential.payer_address();
    debug!(
        payer = %payer,
        network = %requirement.network,
        amount = %requirement.max_amount_required,
        asset = %requirement.asset,
        "Preparing payment authorization"
    );

    let authorization = build_authorization(requirement, &payer);

    // Sign the canonical JSON bytes of the authorization.
    let message = serde_json::to_vec(&authorization)
        .map_err(|e| X402Error::SigningFailure(format!("authorization encode error: {}", e)))?;
    let signature = credential.sign(&message);

    let payload = PaymentPayload {
        x402_version: version,
        scheme: requirement.scheme.clone(),
        network: requirement.network.clone(),
        payload: ExactPaymentDetails {
            signature,
            authorization,
        },
    };

    let token = payload.to_header()?;
    info!(len = token.len(), "Payment header generated");

    Ok(SignedPaymentToken::new(token))
}

/// Construct the unsigned authorization bound to the requirement.
///
/// The nonce is hex-encoded as soon as it is generated; raw bytes never
/// reach the payload.
fn build_authorization(requirement: &PaymentRequirement, payer: &str) -> PaymentAuthorization {
    let now = Utc::now().timestamp();
    let valid_before = now + requirement.timeout_seconds() as i64;

    let mut nonce = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut nonce);

    PaymentAuthorization {
        from: payer.to_string(),
        to: requirement.pay_to.clone(),
        value: requirement.max_amount_required.clone(),
        asset: requirement.asset.clone(),
        network: requirement.network.clone(),
        valid_after: now.to_string(),
        valid_before: valid_before.to_string(),
        nonce: hex::encode(nonce),
    }
}
