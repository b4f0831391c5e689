pub(crate) mod placer;
pub(crate) mod text;
