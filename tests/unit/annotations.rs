use kwave_cli::annotations::{
    format_dependencies, format_substitutions, parse_dependencies, parse_substitutions, read_dependencies,
    read_substitutions, write_dependencies, write_substitutions,
};
use kwave_cli::core::ObjectId;
use kwave_cli::test_utils::DocumentBuilder;

fn squash(text: &str) -> String {
    text.split_whitespace().collect()
}

#[test]
fn test_dependencies_round_trip() {
    let text = "/namespaces/web/Secret/db,rbac.authorization.k8s.io/ClusterRole/reader,apps/namespaces/web/Deployment/api";
    assert_eq!(format_dependencies(&parse_dependencies(text).unwrap()), text);

    // Whitespace around entries is not significant
    let spaced = "/namespaces/web/Secret/db, rbac.authorization.k8s.io/ClusterRole/reader";
    assert_eq!(squash(&format_dependencies(&parse_dependencies(spaced).unwrap())), squash(spaced));
}

#[test]
fn test_substitutions_round_trip() {
    let text = r#"- sourceRef:
    group: networking.k8s.io
    kind: Ingress
    name: web
    namespace: web
  sourcePath: $.spec.rules[0].http.paths[0].backend.service.port.number
  targetPath: $.spec.containers[0].env[0].value
  token: ${service-port}
- sourceRef:
    apiVersion: v1
    kind: ConfigMap
    name: settings
  sourcePath: $.data
  targetPath: $.spec.settings
"#;
    let parsed = parse_substitutions(text).unwrap();
    let encoded = format_substitutions(&parsed).unwrap();
    assert_eq!(parse_substitutions(&encoded).unwrap(), parsed);
    assert_eq!(squash(&format_substitutions(&parse_substitutions(&encoded).unwrap()).unwrap()), squash(&encoded));
}

#[test]
fn test_document_accessors() {
    let mut document = DocumentBuilder::new("v1", "Pod", "app").namespace("web").build();
    assert!(read_dependencies(&document).unwrap().is_empty());
    assert!(read_substitutions(&document).unwrap().is_none());

    let ids = vec![ObjectId::new("", "Secret", "web", "db")];
    write_dependencies(&mut document, &ids);
    assert_eq!(read_dependencies(&document).unwrap(), ids);

    let substitutions =
        parse_substitutions(r#"[{"sourceRef": {"kind": "Secret", "name": "db"}, "sourcePath": "$.data.x", "targetPath": "$.spec.x"}]"#)
            .unwrap();
    write_substitutions(&mut document, &substitutions).unwrap();
    assert_eq!(read_substitutions(&document).unwrap(), Some(substitutions));

    write_dependencies(&mut document, &[]);
    assert!(read_dependencies(&document).unwrap().is_empty());
}
