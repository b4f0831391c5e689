pub(crate) mod capture;
pub(crate) mod projection;
pub(crate) mod transform;
