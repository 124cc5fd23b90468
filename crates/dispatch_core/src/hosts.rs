/// Compute hosts eligible for job placement, in first-seen order.
///
/// An empty set means no placement constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostSet {
    hosts: Vec<String>,
}

impl HostSet {
    /// One host per line; blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Self {
        let mut hosts: Vec<String> = Vec::new();
        for line in text.lines() {
            let host = line.split('#').next().unwrap_or_default().trim();
            if host.is_empty() || hosts.iter().any(|known| known == host) {
                continue;
            }
            hosts.push(host.to_string());
        }
        Self { hosts }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// Space-separated list, the form schedulers take for a host constraint.
    pub fn joined(&self) -> String {
        self.hosts.join(" ")
    }
}
