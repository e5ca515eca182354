pub mod calculus;
pub mod evaluate;
pub mod linear_algebra;
pub mod numeric;
pub mod polynomial;
pub mod simplify;
pub mod solve;
