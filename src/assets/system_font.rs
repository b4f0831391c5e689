use std::sync::Arc;

use usvg::fontdb;

/// Reference under which the system face is cached and registered.
pub(crate) const SYSTEM_FONT_REF: &str = "system:sans-serif";

/// Bytes of an installed sans-serif face, for text whose own font cannot be loaded.
///
/// Prefers the face fontdb resolves for the generic sans-serif family, then any regular-weight
/// upright face. Collection members other than the first are skipped because glyph painting
/// assumes face index 0.
pub(crate) fn load_system_font() -> Option<Arc<Vec<u8>>> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..Default::default()
    };
    let first_face = |id: &fontdb::ID| db.face(*id).is_some_and(|f| f.index == 0);
    let id = db.query(&query).filter(first_face).or_else(|| {
        db.faces()
            .filter(|f| f.index == 0 && f.style == fontdb::Style::Normal)
            .min_by_key(|f| {
                let sans = f.families.iter().any(|(name, _)| name.contains("Sans"));
                (f.weight.0.abs_diff(400), !sans)
            })
            .map(|f| f.id)
    });

    let Some(id) = id else {
        tracing::warn!(faces = db.len(), "no usable system font found");
        return None;
    };
    let bytes = db.with_face_data(id, |data, _| data.to_vec())?;
    tracing::debug!(bytes = bytes.len(), "loaded system fallback font");
    Some(Arc::new(bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/system_font.rs"]
mod tests;
