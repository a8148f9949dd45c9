//! Price feed creation chain.
//!
//! Two steps: the wormhole package verifies the attestation, then the pyth
//! package consumes the verified message to create price feeds.

use crate::blockchain::type_tag::StructTag;
use crate::blockchain::{
    Address, Argument, CallChain, CallStep, ChainBuildError, MoveTarget, TypeTag, CLOCK_OBJECT_ID,
};

/// Oracle packages and their shared state objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFeedTargets {
    pub pyth_package: Address,
    pub pyth_state: Address,
    pub worm_package: Address,
    pub worm_state: Address,
}

impl PriceFeedTargets {
    /// Element type of the verified message vector.
    fn vaa_type(&self) -> TypeTag {
        TypeTag::Struct(Box::new(StructTag {
            address: self.worm_package,
            module: "vaa".to_string(),
            name: "VAA".to_string(),
            type_params: Vec::new(),
        }))
    }
}

/// Build the chain registering price feeds from `attestation`.
pub fn build_price_feed_chain(
    attestation: &[u8],
    targets: &PriceFeedTargets,
) -> Result<CallChain, ChainBuildError> {
    let verify = CallStep::new(MoveTarget::new(
        targets.worm_package,
        "vaa",
        "parse_and_verify",
    )?)
    .argument(Argument::object(targets.worm_state))
    .argument(Argument::byte_vector(attestation)?)
    .argument(Argument::object_read_only(CLOCK_OBJECT_ID))
    .outputs(1);

    let (chain, verified) = CallChain::new().append_step(verify)?;

    let create = CallStep::new(MoveTarget::new(
        targets.pyth_package,
        "pyth",
        "create_price_feeds",
    )?)
    .argument(Argument::object(targets.pyth_state))
    .argument(Argument::typed_vector(
        targets.vaa_type(),
        verified.into_iter().map(Argument::from).collect(),
    ))
    .argument(Argument::object_read_only(CLOCK_OBJECT_ID));

    let (chain, _) = chain.append_step(create)?;

    tracing::debug!(steps = chain.len(), attestation_len = attestation.len(), "Price feed chain built");
    Ok(chain)
}
