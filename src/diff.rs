use std::collections::HashSet;

use crate::domain::{Document, Filing};

pub trait Identified {
    fn identifier(&self) -> &str;
}

impl Identified for Filing {
    fn identifier(&self) -> &str {
        &self.canonical_id
    }
}

impl Identified for Document {
    fn identifier(&self) -> &str {
        &self.name
    }
}

pub fn missing<T: Identified>(known: &HashSet<String>, remote: Vec<T>) -> Vec<T> {
    remote
        .into_iter()
        .filter(|entity| !known.contains(entity.identifier()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_in_remote_are_kept() {
        let known = HashSet::from(["a.htm".to_string()]);
        let remote = vec![
            Document::new("b.htm"),
            Document::new("a.htm"),
            Document::new("b.htm"),
        ];
        let names: Vec<_> = missing(&known, remote)
            .into_iter()
            .map(|doc| doc.name)
            .collect();
        assert_eq!(names, vec!["b.htm", "b.htm"]);
    }
}
