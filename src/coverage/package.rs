//! Package grouping for Cobertura reports
//!
//! Cobertura groups classes into packages. Source files have neither, so a
//! file's directory becomes its package and its base name its class.

use std::collections::BTreeMap;

use super::{Coverage, FileCoverage};

/// Package key of a file: its directory with `/` replaced by `.`.
///
/// ```
/// use llvm_cov_xml::coverage::package_name;
///
/// assert_eq!(package_name("Sources/Model/User.swift"), "Sources.Model");
/// assert_eq!(package_name("main.swift"), "");
/// ```
pub fn package_name(file: &str) -> String {
    match file.rsplit_once('/') {
        Some((dir, _)) => dir.replace('/', "."),
        None => String::new(),
    }
}

/// Display name of a file's class: the base name with every run of
/// non-alphanumeric characters collapsed into one `_`.
pub fn class_name(file: &str) -> String {
    let base = file.rsplit('/').next().unwrap_or(file);

    let mut name = String::with_capacity(base.len());
    let mut in_separator = false;
    for c in base.chars() {
        if c.is_alphanumeric() {
            name.push(c);
            in_separator = false;
        } else if !in_separator {
            name.push('_');
            in_separator = true;
        }
    }
    name
}

/// Files of the report grouped by package, both levels sorted by name.
pub fn group_packages(coverage: &Coverage) -> BTreeMap<String, Vec<(&str, &FileCoverage)>> {
    let mut packages: BTreeMap<String, Vec<(&str, &FileCoverage)>> = BTreeMap::new();
    for (file, lines) in coverage {
        packages
            .entry(package_name(file))
            .or_default()
            .push((file.as_str(), lines));
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("a/b/c/File.swift"), "a.b.c");
        assert_eq!(package_name("a/File.swift"), "a");
        assert_eq!(package_name("File.swift"), "");
        assert_eq!(package_name("a/b/One.swift"), package_name("a/b/Two.swift"));
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("Sources/Foo.swift"), "Foo_swift");
        assert_eq!(class_name("View+Layout.generated.swift"), "View_Layout_generated_swift");
        assert_eq!(class_name("a/my--file..m"), "my_file_m");
        assert_eq!(class_name("Ünïcode.swift"), "Ünïcode_swift");
    }

    #[test]
    fn test_group_packages() {
        let mut coverage = Coverage::new();
        coverage.insert("b/Z.swift".to_string(), Vec::new());
        coverage.insert("a/Y.swift".to_string(), Vec::new());
        coverage.insert("b/A.swift".to_string(), Vec::new());
        coverage.insert("Top.swift".to_string(), Vec::new());

        let packages = group_packages(&coverage);
        let names: Vec<&str> = packages.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["", "a", "b"]);

        let files: Vec<&str> = packages["b"].iter().map(|(name, _)| *name).collect();
        assert_eq!(files, vec!["b/A.swift", "b/Z.swift"]);
    }
}
