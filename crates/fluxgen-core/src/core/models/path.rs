use super::ids::TargetId;

/// Traversal of one target material by a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub target: TargetId,
    pub length: f64,
}

/// Ordered list of `(target, length)` pairs produced by a geometry analyzer for one probe.
///
/// An empty list is a normal value: the probe missed every volume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathLengthList {
    segments: Vec<PathSegment>,
}

impl PathLengthList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: TargetId, length: f64) {
        self.segments.push(PathSegment { target, length });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl FromIterator<(TargetId, f64)> for PathLengthList {
    fn from_iter<I: IntoIterator<Item = (TargetId, f64)>>(iter: I) -> Self {
        Self {
            segments: iter
                .into_iter()
                .map(|(target, length)| PathSegment { target, length })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PathLengthList {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_keeps_insertion_order_and_sums_lengths() {
        let carbon = TargetId::nucleus(6, 12);
        let iron = TargetId::nucleus(26, 56);
        let mut list = PathLengthList::new();
        list.push(carbon, 1.5);
        list.push(iron, 2.0);
        list.push(carbon, 0.5);

        let targets: Vec<_> = list.iter().map(|s| s.target).collect();
        assert_eq!(targets, vec![carbon, iron, carbon]);
        assert_eq!(list.len(), 3);
        assert!((list.total_length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn collecting_empty_iterator_gives_empty_list() {
        let list: PathLengthList = std::iter::empty().collect();
        assert!(list.is_empty());
        assert_eq!(list.total_length(), 0.0);
    }
}
