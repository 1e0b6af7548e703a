//! Static model list used when no backend is reachable.

use crate::{ModelDescriptor, ModelDetails};

pub fn fixture_models() -> Vec<ModelDescriptor> {
    vec![
        fixture(
            "llama3.1:8b",
            4_661_224_676,
            "sha256:42182419e950",
            "2024-01-15T10:30:00Z",
            "llama",
            "8B",
        ),
        fixture(
            "llava:7b",
            4_109_793_677,
            "sha256:8dd30f6b0cb1",
            "2024-01-14T15:45:00Z",
            "llava",
            "7B",
        ),
        fixture(
            "codellama:13b",
            7_365_960_935,
            "sha256:9f438cb9cd581040003681",
            "2024-01-13T09:20:00Z",
            "llama",
            "13B",
        ),
        fixture(
            "mistral:7b",
            4_109_793_677,
            "sha256:61e88e884507",
            "2024-01-12T14:10:00Z",
            "mistral",
            "7B",
        ),
    ]
}

fn fixture(
    name: &str,
    size: u64,
    digest: &str,
    modified_at: &str,
    family: &str,
    parameter_size: &str,
) -> ModelDescriptor {
    ModelDescriptor::new(name)
        .with_size(size)
        .with_digest(digest)
        .with_modified_at(modified_at)
        .with_details(ModelDetails {
            family: Some(family.to_string()),
            format: Some("gguf".to_string()),
            parameter_size: Some(parameter_size.to_string()),
        })
}
