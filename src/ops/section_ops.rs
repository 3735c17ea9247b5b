use crate::model::section::{BoardDoc, Section, SectionId};
use crate::model::task::Label;

/// Error type for section operations
#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    #[error("section not found: {0}")]
    NotFound(String),
    #[error("section reference is ambiguous: {0}")]
    Ambiguous(String),
    #[error("section title cannot be empty")]
    EmptyTitle,
}

/// Insert a new empty section, at the end or right after `after`.
pub fn add_section(
    doc: &mut BoardDoc,
    title: &str,
    after: Option<&SectionId>,
) -> Result<SectionId, SectionError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SectionError::EmptyTitle);
    }
    let position = match after {
        None => doc.sections.len(),
        Some(after) => {
            doc.sections
                .iter()
                .position(|s| &s.id == after)
                .ok_or_else(|| SectionError::NotFound(after.to_string()))?
                + 1
        }
    };
    let section = Section::new(title);
    let id = section.id.clone();
    doc.sections.insert(position, section);
    Ok(id)
}

/// Fold or unfold a whole section. Returns the new value.
pub fn toggle_section_collapse(doc: &mut BoardDoc, id: &SectionId) -> Result<bool, SectionError> {
    let section = doc
        .section_mut(id)
        .ok_or_else(|| SectionError::NotFound(id.to_string()))?;
    section.collapsed = !section.collapsed;
    Ok(section.collapsed)
}

pub fn rename_section(doc: &mut BoardDoc, id: &SectionId, title: &str) -> Result<(), SectionError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SectionError::EmptyTitle);
    }
    let section = doc
        .section_mut(id)
        .ok_or_else(|| SectionError::NotFound(id.to_string()))?;
    section.title = title.to_string();
    Ok(())
}

/// Remove a section together with all of its tasks.
pub fn remove_section(doc: &mut BoardDoc, id: &SectionId) -> Result<Section, SectionError> {
    let pos = doc
        .sections
        .iter()
        .position(|s| &s.id == id)
        .ok_or_else(|| SectionError::NotFound(id.to_string()))?;
    Ok(doc.sections.remove(pos))
}

/// Resolve a user reference to a section: exact id, unique id prefix, or
/// case-insensitive title, in that order.
pub fn resolve_section(doc: &BoardDoc, input: &str) -> Result<SectionId, SectionError> {
    let input = input.trim();
    if let Some(s) = doc.sections.iter().find(|s| s.id.as_str() == input) {
        return Ok(s.id.clone());
    }

    let by_prefix: Vec<&Section> = doc
        .sections
        .iter()
        .filter(|s| !input.is_empty() && s.id.as_str().starts_with(input))
        .collect();
    if let [one] = by_prefix.as_slice() {
        return Ok(one.id.clone());
    }

    let lowered = input.to_lowercase();
    let by_title: Vec<&Section> = doc
        .sections
        .iter()
        .filter(|s| s.title.to_lowercase() == lowered)
        .collect();
    match (by_title.as_slice(), by_prefix.len()) {
        ([one], _) => Ok(one.id.clone()),
        ([], 0) => Err(SectionError::NotFound(input.to_string())),
        _ => Err(SectionError::Ambiguous(input.to_string())),
    }
}

/// Look a label up by title (case-insensitive), adding it to the catalog if
/// it is new.
pub fn ensure_label(doc: &mut BoardDoc, title: &str) -> Label {
    let title = title.trim();
    let lowered = title.to_lowercase();
    if let Some(label) = doc.labels.iter().find(|l| l.title.to_lowercase() == lowered) {
        return label.clone();
    }
    let next_id = doc
        .labels
        .iter()
        .filter_map(|l| l.id.parse::<u64>().ok())
        .max()
        .map_or(0, |n| n + 1);
    let label = Label {
        id: next_id.to_string(),
        title: title.to_string(),
    };
    doc.labels.push(label.clone());
    label
}
