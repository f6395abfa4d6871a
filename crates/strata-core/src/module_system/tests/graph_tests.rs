#![cfg(test)]

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::kernel::container::ServiceContainer;
use crate::kernel::error::BoxError;
use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::graph::{build_and_sort, detect_cycles};
use crate::module_system::{Module, ModuleCatalog, ModuleDefinition, ModuleSystemError, ModuleType};
use crate::plugin_system::{PluginSource, TypeSource};
use crate::tests::common::*;

async fn catalog_for(root: ModuleType) -> Vec<ModuleDescriptor> {
    let mut catalog = ModuleCatalog::new();
    catalog.discover_module_types(&root, &[]).await.unwrap();
    catalog.into_descriptors()
}

fn short_names(descriptors: &[ModuleDescriptor]) -> Vec<&'static str> {
    descriptors
        .iter()
        .map(|d| d.module_type().short_name())
        .collect()
}

#[tokio::test]
async fn test_chain_order() {
    let root = ModuleType::of::<ModA>();
    let sorted = build_and_sort(catalog_for(root.clone()).await, &root).unwrap();
    assert_eq!(short_names(&sorted), vec!["ModC", "ModB", "ModA"]);
    assert!(sorted.iter().all(|d| d.is_loaded()));
}

#[tokio::test]
async fn test_self_dependency_is_a_one_node_cycle() {
    let root = ModuleType::of::<SelfLoop>();
    let descriptors = catalog_for(root.clone()).await;

    let cycles = detect_cycles(&descriptors);
    assert_eq!(cycles, vec![vec![root.clone(), root.clone()]]);

    match build_and_sort(descriptors, &root) {
        Err(ModuleSystemError::CyclicDependency { path }) => {
            assert_eq!(path.len(), 2);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected a cycle, got {:?}", other.map(|d| d.len())),
    }
}

#[tokio::test]
async fn test_two_node_cycle_path() {
    let root = ModuleType::of::<CycleA>();
    let cycles = detect_cycles(&catalog_for(root.clone()).await);
    assert_eq!(
        cycles,
        vec![vec![root.clone(), ModuleType::of::<CycleB>(), root]]
    );
}

#[tokio::test]
async fn test_cycle_message_renders_path() {
    let root = ModuleType::of::<CycleA>();
    let err = build_and_sort(catalog_for(root.clone()).await, &root).unwrap_err();
    let message = err.to_string();
    assert!(message.contains(" -> "));
    assert!(message.matches("CycleA").count() == 2, "{}", message);
}

#[tokio::test]
async fn test_acyclic_catalog_reports_no_cycles() {
    let descriptors = catalog_for(ModuleType::of::<Top>()).await;
    assert!(detect_cycles(&descriptors).is_empty());
}

#[tokio::test]
async fn test_root_is_last_among_independent_modules() {
    let root = ModuleType::of::<Lonely>();
    let mut descriptors = catalog_for(root.clone()).await;
    // Independent modules discovered after the root still precede it.
    descriptors.extend(catalog_for(ModuleType::of::<ModC>()).await);
    descriptors.extend(catalog_for(ModuleType::of::<Base>()).await);

    let sorted = build_and_sort(descriptors, &root).unwrap();
    assert_eq!(short_names(&sorted), vec!["ModC", "Base", "Lonely"]);
}

#[tokio::test]
async fn test_root_precedes_plugin_modules_that_depend_on_it() {
    let root = ModuleType::of::<ModC>();
    let sources: Vec<Box<dyn PluginSource>> = vec![Box::new(TypeSource::new().with::<ModA>())];
    let mut catalog = ModuleCatalog::new();
    catalog.discover_module_types(&root, &sources).await.unwrap();

    let sorted = build_and_sort(catalog.into_descriptors(), &root).unwrap();
    assert_eq!(short_names(&sorted), vec!["ModC", "ModB", "ModA"]);
}

#[tokio::test]
async fn test_unknown_dependency_is_reported() {
    let descriptors = vec![ModuleDescriptor::new(
        ModuleType::of::<ModB>(),
        vec![ModuleType::of::<ModC>()],
    )];
    match build_and_sort(descriptors, &ModuleType::of::<ModB>()) {
        Err(ModuleSystemError::UnknownDependency { module, dependency }) => {
            assert!(module.ends_with("ModB"));
            assert!(dependency.ends_with("ModC"));
        }
        other => panic!("expected UnknownDependency, got {:?}", other.map(|d| d.len())),
    }
}

// Sixteen placeholder module types for randomized graphs. Dependencies are
// supplied directly to descriptors, so the declared lists stay empty.
macro_rules! placeholder_modules {
    ($($name:ident),+) => {
        $(
            struct $name;
            impl Module for $name {}
            impl ModuleDefinition for $name {
                fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
                    Ok($name)
                }
            }
        )+
        fn placeholder_types() -> Vec<ModuleType> {
            vec![$(ModuleType::of::<$name>()),+]
        }
    };
}

placeholder_modules!(N0, N1, N2, N3, N4, N5, N6, N7, N8, N9, N10, N11, N12, N13, N14, N15);

#[test]
fn test_random_dags_sort_dependencies_first() {
    let types = placeholder_types();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50 {
        // Edges only point from higher to lower rank, so the graph is acyclic.
        let mut ranks: Vec<usize> = (0..types.len()).collect();
        for i in (1..ranks.len()).rev() {
            ranks.swap(i, rng.gen_range(0..=i));
        }
        let mut edges: HashMap<usize, Vec<usize>> = HashMap::new();
        for from in 0..types.len() {
            for to in 0..types.len() {
                if ranks[from] > ranks[to] && rng.gen_bool(0.2) {
                    edges.entry(from).or_default().push(to);
                }
            }
        }

        let descriptors: Vec<ModuleDescriptor> = (0..types.len())
            .map(|i| {
                let deps = edges
                    .get(&i)
                    .map(|targets| targets.iter().map(|&t| types[t].clone()).collect())
                    .unwrap_or_default();
                ModuleDescriptor::new(types[i].clone(), deps)
            })
            .collect();
        assert!(detect_cycles(&descriptors).is_empty());

        let root = types[rng.gen_range(0..types.len())].clone();
        let sorted = build_and_sort(descriptors, &root).unwrap();
        assert_eq!(sorted.len(), types.len());

        let position: HashMap<&'static str, usize> = sorted
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name(), i))
            .collect();
        for descriptor in &sorted {
            for dependency in descriptor.dependencies() {
                assert!(
                    position[dependency.name()] < position[descriptor.name()],
                    "{} must load before {}",
                    dependency.name(),
                    descriptor.name()
                );
            }
        }

        // Nothing depending on the root means the root is last.
        let root_has_dependents = sorted.iter().any(|d| d.depends_on(&root));
        if !root_has_dependents {
            assert_eq!(sorted.last().unwrap().module_type(), &root);
        }
    }
}

#[test]
fn test_random_cycles_are_always_detected() {
    let types = placeholder_types();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..20 {
        let len = rng.gen_range(1..=6);
        let start = rng.gen_range(0..types.len() - len);
        let members: Vec<usize> = (start..start + len).collect();

        let descriptors: Vec<ModuleDescriptor> = (0..types.len())
            .map(|i| {
                let deps = match members.iter().position(|&m| m == i) {
                    Some(p) => vec![types[members[(p + 1) % len]].clone()],
                    None => Vec::new(),
                };
                ModuleDescriptor::new(types[i].clone(), deps)
            })
            .collect();

        let cycles = detect_cycles(&descriptors);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), len + 1);
        assert_eq!(cycles[0].first(), cycles[0].last());
        assert!(build_and_sort(descriptors, &types[0]).is_err());
    }
}
