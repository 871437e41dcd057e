//! Structural checks over the rendered declaration, end to end through the
//! synth command.

use assert_cmd::Command;

fn synth() -> serde_json::Value {
    let output = Command::cargo_bin("stratus")
        .unwrap()
        .arg("synth")
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn synth_is_byte_identical_between_runs() {
    let first = Command::cargo_bin("stratus")
        .unwrap()
        .arg("synth")
        .output()
        .unwrap();
    let second = Command::cargo_bin("stratus")
        .unwrap()
        .arg("synth")
        .output()
        .unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn declaration_contains_exactly_one_resource_of_each_kind() {
    let doc = synth();
    let resources = doc["resources"].as_object().unwrap();

    for kind in ["bucket", "access-identity", "distribution", "deployment"] {
        let count = resources
            .keys()
            .filter(|key| key.starts_with(&format!("{kind}:")))
            .count();
        assert_eq!(count, 1, "expected exactly one {kind}");
    }
    assert_eq!(resources.len(), 4);
}

#[test]
fn bucket_denies_all_public_access_and_is_destroyed_on_teardown() {
    let doc = synth();
    let bucket = &doc["resources"]["bucket:website"];

    let guards = &bucket["block_public_access"];
    for guard in [
        "block_public_acls",
        "block_public_policy",
        "ignore_public_acls",
        "restrict_public_buckets",
    ] {
        assert_eq!(guards[guard], true, "{guard} must be on");
    }
    assert_eq!(bucket["removal_policy"], "destroy");
    assert_eq!(bucket["enforce_ssl"], true);
    assert_eq!(bucket["encryption"], "s3_managed");
    assert_eq!(bucket["bucket_key_enabled"], true);
}

#[test]
fn error_responses_are_exactly_the_two_spa_rewrites() {
    let doc = synth();
    let rewrites = doc["resources"]["distribution:website"]["error_responses"]
        .as_array()
        .unwrap();

    assert_eq!(rewrites.len(), 2);
    for (rewrite, status) in rewrites.iter().zip([403, 404]) {
        assert_eq!(rewrite["http_status"], status);
        assert_eq!(rewrite["response_http_status"], 200);
        assert_eq!(rewrite["response_page_path"], "/index.html");
        assert_eq!(rewrite["ttl_minutes"], 0);
    }
}

#[test]
fn deployment_invalidation_paths_are_exactly_the_wildcard() {
    let doc = synth();
    let paths = doc["resources"]["deployment:website"]["distribution_paths"]
        .as_array()
        .unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0], "/*");
}

#[test]
fn every_resource_and_the_stack_carry_both_tags() {
    let doc = synth();

    let check = |tags: &serde_json::Value, what: &str| {
        assert_eq!(tags["task"], "5", "{what} missing task tag");
        assert_eq!(tags["owner"], "ashymanouski", "{what} missing owner tag");
    };

    check(&doc["stack"]["tags"], "stack");
    for (key, resource) in doc["resources"].as_object().unwrap() {
        check(&resource["tags"], key);
    }
}

#[test]
fn outputs_reference_the_distribution_and_bucket_domains() {
    let doc = synth();
    let outputs = doc["outputs"].as_object().unwrap();

    assert_eq!(outputs.len(), 2);
    assert_eq!(
        outputs["CloudFrontURL"]["value"],
        "https://${distribution:website:domain-name}"
    );
    assert_eq!(
        outputs["BucketName"]["value"],
        "${bucket:website:regional-domain-name}"
    );
}
