use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Gauss-Jordan elimination ran out of usable pivots.
    #[error("singular matrix in MatrixInvert")]
    SingularMatrix,

    /// The up vector of a look-at transform is parallel to the view direction.
    #[error("\"up\" vector and viewing direction passed to LookAt are pointing in the same direction")]
    DegenerateLookAt,
}
