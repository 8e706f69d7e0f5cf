//! The packaged/classpath-equivalent fallback tier: a small set of default
//! templates embedded directly in the binary via `include_str!`, consulted
//! last after the primary and override filesystem folders. This is the
//! Rust-native stand-in for "ship defaults on the classpath" — there is no
//! classpath in a static binary, so the defaults travel with the crate
//! instead.

pub const MESSAGE_TEMPLATES: &[(&str, &str)] = &[
    (
        "message/ADT_A01",
        include_str!("../resources/embedded/message/ADT_A01.yml"),
    ),
    (
        "message/ADT_A03",
        include_str!("../resources/embedded/message/ADT_A03.yml"),
    ),
];

pub const RESOURCE_TEMPLATES: &[(&str, &str)] = &[
    (
        "resource/Patient.yml",
        include_str!("../resources/embedded/resource/Patient.yml"),
    ),
    (
        "resource/Encounter.yml",
        include_str!("../resources/embedded/resource/Encounter.yml"),
    ),
    (
        "resource/AllergyIntolerance.yml",
        include_str!("../resources/embedded/resource/AllergyIntolerance.yml"),
    ),
    (
        "resource/Identifier.yml",
        include_str!("../resources/embedded/resource/Identifier.yml"),
    ),
    (
        "resource/HumanName.yml",
        include_str!("../resources/embedded/resource/HumanName.yml"),
    ),
];

pub fn find_message_template(key: &str) -> Option<&'static str> {
    MESSAGE_TEMPLATES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

pub fn find_resource_template(path: &str) -> Option<&'static str> {
    RESOURCE_TEMPLATES
        .iter()
        .find(|(k, _)| *k == path)
        .map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_adt_a01_parses() {
        let yaml = find_message_template("message/ADT_A01").expect("embedded default present");
        let template: crate::ast::MessageTemplate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(template.name, "ADT_A01");
    }
}
