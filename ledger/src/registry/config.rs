/// Registry behaviour knobs.
#[derive(Clone, Debug, Default)]
pub struct RegistryConfig {
    /// Reject `record_prediction` for a name that already has history.
    ///
    /// Off by default: re-recording starts a new latest block for the name.
    pub reject_rerecord: bool,
}
