pub type LabelName = String;

pub type LabelValue = String;

pub const NAME_LABEL: &str = "__name__";
pub const INSTANCE_LABEL: &str = "instance";
pub const JOB_LABEL: &str = "job";
pub const QUANTILE_LABEL: &str = "quantile";
pub const BUCKET_LABEL: &str = "le";

/// Labels every series starts with. They can't be overridden by
/// labels coming from the input document.
pub const BASE_LABELS: [&str; 3] = [NAME_LABEL, INSTANCE_LABEL, JOB_LABEL];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    name: LabelName,
    value: LabelValue,
}

impl Label {
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<LabelName>,
        V: Into<LabelValue>,
    {
        let name = name.into();
        debug_assert!(!name.is_empty());

        Self {
            name,
            value: value.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &LabelName {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &LabelValue {
        &self.value
    }
}

/// Ordered label list of a single series. Names are unique within the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// `__name__`, `instance` and `job`, in that order.
    pub fn base<N, I, J>(name: N, instance: I, job: J) -> Self
    where
        N: Into<LabelValue>,
        I: Into<LabelValue>,
        J: Into<LabelValue>,
    {
        Self {
            labels: vec![
                Label::new(NAME_LABEL, name),
                Label::new(INSTANCE_LABEL, instance),
                Label::new(JOB_LABEL, job),
            ],
        }
    }

    pub fn is_base_label(name: &str) -> bool {
        BASE_LABELS.contains(&name)
    }

    /// Sets the label, keeping its position if the name is already taken
    /// and appending it otherwise.
    pub fn set<N, V>(&mut self, name: N, value: V)
    where
        N: Into<LabelName>,
        V: Into<LabelValue>,
    {
        let label = Label::new(name, value);
        match self.labels.iter_mut().find(|l| l.name == label.name) {
            Some(existing) => existing.value = label.value,
            None => self.labels.push(label),
        }
    }

    /// Appends extra labels, skipping the ones that would shadow a base
    /// label. Returns the names of the skipped labels.
    pub fn merge<'a, I>(&mut self, labels: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut skipped = vec![];
        for (name, value) in labels {
            if Self::is_base_label(name) {
                skipped.push(name);
                continue;
            }
            self.set(name, value);
        }
        skipped
    }

    pub fn with<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<LabelName>,
        V: Into<LabelValue>,
    {
        self.set(name, value);
        self
    }

    /// Removes the label, closing the gap it leaves behind.
    pub fn remove(&mut self, name: &str) -> Option<LabelValue> {
        let idx = self.labels.iter().position(|l| l.name == name)?;
        Some(self.labels.remove(idx).value)
    }

    pub fn get(&self, name: &str) -> Option<&LabelValue> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| &l.value)
    }

    pub fn name(&self) -> Option<&LabelValue> {
        self.get(NAME_LABEL)
    }

    pub fn iter(&self) -> std::slice::Iter<Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(labels: &LabelSet) -> Vec<&str> {
        labels.iter().map(|l| l.name().as_str()).collect()
    }

    #[test]
    fn test_base_order() {
        let labels = LabelSet::base("up", "demo:9090", "node");
        assert_eq!(names(&labels), vec!["__name__", "instance", "job"]);
        assert_eq!(labels.name(), Some(&"up".to_string()));
        assert_eq!(labels.get("job"), Some(&"node".to_string()));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut labels = LabelSet::base("x", "i", "j").with("le", "1").with("code", "200");
        labels.set("le", "+Inf");

        assert_eq!(names(&labels), vec!["__name__", "instance", "job", "le", "code"]);
        assert_eq!(labels.get("le"), Some(&"+Inf".to_string()));
    }

    #[test]
    fn test_remove() {
        let mut labels = LabelSet::base("x", "i", "j").with("le", "bogus").with("zone", "a");

        assert_eq!(labels.remove("le"), Some("bogus".to_string()));
        assert_eq!(labels.remove("le"), None);
        assert_eq!(names(&labels), vec!["__name__", "instance", "job", "zone"]);

        labels.set("le", "1");
        assert_eq!(names(&labels), vec!["__name__", "instance", "job", "zone", "le"]);
    }

    #[test]
    fn test_merge_skips_base_labels() {
        let mut labels = LabelSet::base("x", "i", "j");
        let skipped = labels.merge(vec![("job", "other"), ("code", "500"), ("__name__", "y")]);

        assert_eq!(skipped, vec!["job", "__name__"]);
        assert_eq!(names(&labels), vec!["__name__", "instance", "job", "code"]);
        assert_eq!(labels.get("job"), Some(&"j".to_string()));
        assert_eq!(labels.name(), Some(&"x".to_string()));
    }
}
