pub(crate) mod graph;
