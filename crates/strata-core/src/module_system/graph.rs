//! Dependency ordering of discovered modules.
//!
//! Both passes are depth-first with three marks per node. Nodes are visited in
//! discovery order and dependencies in declaration order, so the output is
//! stable for a given catalog.
use std::collections::HashMap;

use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::module_type::ModuleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn index_by_name(descriptors: &[ModuleDescriptor]) -> HashMap<&'static str, usize> {
    descriptors
        .iter()
        .enumerate()
        .map(|(position, descriptor)| (descriptor.name(), position))
        .collect()
}

/// Every cycle met by the traversal. Each path starts and ends with the same
/// module; a self-dependency yields `[A, A]`.
///
/// Dependencies without a descriptor are ignored here and reported by
/// [`build_and_sort`].
pub fn detect_cycles(descriptors: &[ModuleDescriptor]) -> Vec<Vec<ModuleType>> {
    let index = index_by_name(descriptors);
    let mut marks = vec![Mark::Unvisited; descriptors.len()];
    let mut path = Vec::new();
    let mut cycles = Vec::new();

    for start in 0..descriptors.len() {
        if marks[start] == Mark::Unvisited {
            collect_cycles(start, descriptors, &index, &mut marks, &mut path, &mut cycles);
        }
    }
    cycles
}

fn collect_cycles(
    node: usize,
    descriptors: &[ModuleDescriptor],
    index: &HashMap<&'static str, usize>,
    marks: &mut [Mark],
    path: &mut Vec<usize>,
    cycles: &mut Vec<Vec<ModuleType>>,
) {
    marks[node] = Mark::InProgress;
    path.push(node);

    for dependency in descriptors[node].dependencies() {
        let Some(&next) = index.get(dependency.name()) else {
            continue;
        };
        match marks[next] {
            Mark::Unvisited => collect_cycles(next, descriptors, index, marks, path, cycles),
            Mark::InProgress => {
                let begin = path.iter().position(|&p| p == next).unwrap_or(0);
                let mut cycle: Vec<ModuleType> = path[begin..]
                    .iter()
                    .map(|&p| descriptors[p].module_type().clone())
                    .collect();
                cycle.push(descriptors[next].module_type().clone());
                cycles.push(cycle);
            }
            Mark::Done => {}
        }
    }

    path.pop();
    marks[node] = Mark::Done;
}

/// Order descriptors so every module follows all of its dependencies.
///
/// Independent modules keep discovery order and `root` is placed after every
/// module that does not depend on it. Fails without a partial result if any
/// cycle exists. Returned descriptors are marked loaded.
pub fn build_and_sort(
    descriptors: Vec<ModuleDescriptor>,
    root: &ModuleType,
) -> Result<Vec<ModuleDescriptor>, ModuleSystemError> {
    if let Some(cycle) = detect_cycles(&descriptors).into_iter().next() {
        return Err(ModuleSystemError::CyclicDependency {
            path: cycle.iter().map(|module| module.name().to_string()).collect(),
        });
    }

    let index = index_by_name(&descriptors);
    let root_position = index.get(root.name()).copied();
    let mut marks = vec![Mark::Unvisited; descriptors.len()];
    let mut order = Vec::with_capacity(descriptors.len());

    let seeds = (0..descriptors.len())
        .filter(|&position| Some(position) != root_position)
        .chain(root_position);
    for seed in seeds {
        if marks[seed] == Mark::Unvisited {
            visit(seed, &descriptors, &index, &mut marks, &mut order)?;
        }
    }

    let mut slots: Vec<Option<ModuleDescriptor>> = descriptors.into_iter().map(Some).collect();
    let mut sorted = Vec::with_capacity(slots.len());
    for position in order {
        if let Some(mut descriptor) = slots[position].take() {
            descriptor.mark_loaded();
            sorted.push(descriptor);
        }
    }

    log::debug!(
        "Module load order: {}",
        sorted.iter().map(|d| d.module_type().short_name()).collect::<Vec<_>>().join(", ")
    );
    Ok(sorted)
}

fn visit(
    node: usize,
    descriptors: &[ModuleDescriptor],
    index: &HashMap<&'static str, usize>,
    marks: &mut [Mark],
    order: &mut Vec<usize>,
) -> Result<(), ModuleSystemError> {
    marks[node] = Mark::InProgress;

    for dependency in descriptors[node].dependencies() {
        let next = *index
            .get(dependency.name())
            .ok_or_else(|| ModuleSystemError::UnknownDependency {
                module: descriptors[node].name().to_string(),
                dependency: dependency.name().to_string(),
            })?;
        if marks[next] == Mark::Unvisited {
            visit(next, descriptors, index, marks, order)?;
        }
    }

    marks[node] = Mark::Done;
    order.push(node);
    Ok(())
}
