/// Failure of a recipe or a factory method: one of its parameters, or the body itself.
#[derive(thiserror::Error, Debug)]
pub enum InstantiatorErrorKind<DepsErr, FactoryErr> {
    #[error("Parameter can't be resolved: {0}")]
    Deps(DepsErr),
    #[error("Recipe failed: {0}")]
    Factory(FactoryErr),
}
