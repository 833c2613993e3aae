//! Baselines: ordered, resolved component graphs.
//!
//! A [`Baseline`] is produced by [`BaselineBuilder::build`], which runs the
//! explicit resolution phase (requirement lookup, package index, dependency
//! adjacency). After that the graph is immutable apart from
//! [`Baseline::rename`], [`Baseline::set_location`] and
//! [`Baseline::dispose`].
//!
//! Components live in an arena (`Vec<Component>`) in declared order and are
//! addressed by index, so dependency cycles need no pointer chasing.

use super::{Component, ComponentId, Type};
use crate::error::{ApiToolsError, ParseErrorKind, ResolutionError, Result};
use crate::utils::structural_hash;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a component was not searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "errors", rename_all = "snake_case")]
pub enum SkipReason {
    /// Matched by the requestor's exclusion list
    Excluded,
    ResolutionFailed(Vec<ResolutionError>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded => f.write_str("excluded by search parameters"),
            Self::ResolutionFailed(errors) => {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "resolution failed: {}", messages.join("; "))
            }
        }
    }
}

/// Placeholder for a component that was not searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedComponent {
    pub id: String,
    pub version: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl SkippedComponent {
    #[must_use]
    pub fn excluded(component: &Component) -> Self {
        Self {
            id: component.symbolic_name.clone(),
            version: component.version.clone(),
            reason: SkipReason::Excluded,
        }
    }

    #[must_use]
    pub fn unresolved(component: &Component) -> Self {
        Self {
            id: component.symbolic_name.clone(),
            version: component.version.clone(),
            reason: SkipReason::ResolutionFailed(
                component.resolution_errors.clone().unwrap_or_default(),
            ),
        }
    }

    #[must_use]
    pub const fn is_excluded(&self) -> bool {
        matches!(self.reason, SkipReason::Excluded)
    }
}

/// A named, ordered and resolved set of components.
#[derive(Debug, Clone)]
pub struct Baseline {
    name: String,
    execution_environment: Option<String>,
    location: Option<PathBuf>,
    components: Vec<Component>,
    by_name: HashMap<String, usize>,
    /// Package name to providing components, in baseline order
    packages: HashMap<String, Vec<usize>>,
    /// `required` edges: component to its prerequisites
    prerequisites: Vec<Vec<usize>>,
    /// Reverse edges: component to the components requiring it
    dependents: Vec<Vec<usize>>,
    disposed: bool,
}

impl Baseline {
    fn check(&self) -> Result<()> {
        if self.disposed {
            Err(ApiToolsError::disposed(&self.name))
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn execution_environment(&self) -> Option<&str> {
        self.execution_environment.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Components in declared order.
    pub fn components(&self) -> Result<&[Component]> {
        self.check()?;
        Ok(&self.components)
    }

    pub fn get_component(&self, symbolic_name: &str) -> Result<Option<&Component>> {
        self.check()?;
        Ok(self.by_name.get(symbolic_name).map(|&idx| &self.components[idx]))
    }

    /// Every component providing `package`, in baseline order.
    ///
    /// Components with resolution errors contribute no types and are never
    /// returned. `from` is the requesting component; lookups see the same
    /// classpath order regardless of the requester.
    pub fn resolve_package(&self, from: &Component, package: &str) -> Result<Vec<&Component>> {
        self.check()?;
        tracing::trace!(from = %from.symbolic_name, package, "resolving package");
        Ok(self
            .packages
            .get(package)
            .map(|indices| indices.iter().map(|&idx| &self.components[idx]).collect())
            .unwrap_or_default())
    }

    /// Find the first component declaring `qualified_name`, in baseline order.
    pub fn find_type(&self, from: &Component, qualified_name: &str) -> Result<Option<(&Component, &Type)>> {
        let package = super::package_of(qualified_name);
        Ok(self
            .resolve_package(from, package)?
            .into_iter()
            .find_map(|c| c.find_type(qualified_name).map(|ty| (c, ty))))
    }

    /// Transitive closure of components that require any of `roots`.
    pub fn dependents_of(&self, roots: &[&Component]) -> Result<Vec<&Component>> {
        self.check()?;
        Ok(self.closure(roots, &self.dependents))
    }

    /// Transitive closure of components required by any of `roots`.
    pub fn prerequisites_of(&self, roots: &[&Component]) -> Result<Vec<&Component>> {
        self.check()?;
        Ok(self.closure(roots, &self.prerequisites))
    }

    /// BFS over `edges` from the seeds. Seeds are never part of the result,
    /// even when a cycle leads back to them. Results follow baseline order.
    fn closure(&self, roots: &[&Component], edges: &[Vec<usize>]) -> Vec<&Component> {
        let mut visited = vec![false; self.components.len()];
        let mut is_seed = vec![false; self.components.len()];
        let mut queue = VecDeque::new();
        for root in roots {
            if let Some(&idx) = self.by_name.get(&root.symbolic_name)
                && !visited[idx]
            {
                visited[idx] = true;
                is_seed[idx] = true;
                queue.push_back(idx);
            }
        }

        while let Some(idx) = queue.pop_front() {
            for &next in &edges[idx] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        self.components
            .iter()
            .enumerate()
            .filter(|&(idx, _)| visited[idx] && !is_seed[idx])
            .map(|(_, c)| c)
            .collect()
    }

    /// Rename the baseline.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        self.check()?;
        self.name = name.into();
        Ok(())
    }

    /// Record where the baseline was loaded from.
    pub fn set_location(&mut self, location: impl Into<PathBuf>) -> Result<()> {
        self.check()?;
        self.location = Some(location.into());
        Ok(())
    }

    /// Release all components. Every later operation fails with
    /// [`ApiToolsError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        tracing::debug!(baseline = %self.name, "disposing baseline");
        self.components.clear();
        self.by_name.clear();
        self.packages.clear();
        self.prerequisites.clear();
        self.dependents.clear();
        self.disposed = true;
    }

    /// Ids of all components, in order.
    pub fn component_ids(&self) -> Result<Vec<ComponentId>> {
        Ok(self.components()?.iter().map(Component::id).collect())
    }
}

/// Populates a [`Baseline`].
#[derive(Debug, Default)]
pub struct BaselineBuilder {
    name: String,
    execution_environment: Option<String>,
    location: Option<PathBuf>,
    components: Vec<Component>,
}

impl BaselineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn execution_environment(mut self, environment: impl Into<String>) -> Self {
        self.execution_environment = Some(environment.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Resolve the graph and freeze it.
    ///
    /// Missing non-optional requirements are recorded as
    /// [`ResolutionError`]s on the requiring component; a duplicate
    /// symbolic name is a hard error.
    pub fn build(self) -> Result<Baseline> {
        let mut components = self.components;
        let mut by_name = HashMap::with_capacity(components.len());
        for (idx, component) in components.iter().enumerate() {
            if by_name
                .insert(component.symbolic_name.clone(), idx)
                .is_some()
            {
                return Err(ApiToolsError::parse(
                    format!("building baseline '{}'", self.name),
                    ParseErrorKind::DuplicateComponent(component.symbolic_name.clone()),
                ));
            }
        }

        let mut prerequisites = vec![Vec::new(); components.len()];
        let mut dependents = vec![Vec::new(); components.len()];
        for (idx, component) in components.iter_mut().enumerate() {
            let mut errors = component.resolution_errors.take().unwrap_or_default();
            for requirement in &component.required {
                match by_name.get(&requirement.name) {
                    Some(&target) => {
                        if !prerequisites[idx].contains(&target) {
                            prerequisites[idx].push(target);
                            dependents[target].push(idx);
                        }
                    }
                    None if requirement.optional => {}
                    None => {
                        let error = ResolutionError::new(
                            &component.symbolic_name,
                            format!("missing required component '{}'", requirement.name),
                        );
                        if !errors.contains(&error) {
                            errors.push(error);
                        }
                    }
                }
            }
            if !errors.is_empty() {
                tracing::warn!(
                    component = %component.symbolic_name,
                    errors = errors.len(),
                    "component failed to resolve"
                );
            }
            component.resolution_errors = (!errors.is_empty()).then_some(errors);
            component.content_hash = structural_hash(&(&component.type_containers, &component.visibility));
        }

        let mut packages: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, component) in components.iter().enumerate() {
            if component.has_resolution_errors() {
                continue;
            }
            for package in component.packages() {
                packages.entry(package.to_string()).or_default().push(idx);
            }
        }

        tracing::debug!(
            baseline = %self.name,
            components = components.len(),
            packages = packages.len(),
            "baseline resolved"
        );

        Ok(Baseline {
            name: self.name,
            execution_environment: self.execution_environment,
            location: self.location,
            components,
            by_name,
            packages,
            prerequisites,
            dependents,
            disposed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentRef, Type, TypeKind};

    fn chain() -> Baseline {
        BaselineBuilder::new("test")
            .component(Component::new("p1", "1.0.0").requires("p2").with_type(Type::new("a.one.A", TypeKind::Class)))
            .component(Component::new("p2", "1.0.0").requires("p3").with_type(Type::new("a.two.B", TypeKind::Class)))
            .component(Component::new("p3", "1.0.0").with_type(Type::new("a.three.C", TypeKind::Class)))
            .build()
            .expect("valid baseline")
    }

    #[test]
    fn test_closures() {
        let baseline = chain();
        let p1 = baseline.get_component("p1").unwrap().unwrap();
        let p3 = baseline.get_component("p3").unwrap().unwrap();

        let prereqs: Vec<&str> = baseline
            .prerequisites_of(&[p1])
            .unwrap()
            .iter()
            .map(|c| c.symbolic_name.as_str())
            .collect();
        assert_eq!(prereqs, vec!["p2", "p3"]);

        let dependents: Vec<&str> = baseline
            .dependents_of(&[p3])
            .unwrap()
            .iter()
            .map(|c| c.symbolic_name.as_str())
            .collect();
        assert_eq!(dependents, vec!["p1", "p2"]);
    }

    #[test]
    fn test_closure_terminates_on_cycle() {
        let baseline = BaselineBuilder::new("cycle")
            .component(Component::new("a", "1").requires("b"))
            .component(Component::new("b", "1").requires("c"))
            .component(Component::new("c", "1").requires("a"))
            .build()
            .unwrap();
        let a = baseline.get_component("a").unwrap().unwrap();
        let names: Vec<&str> = baseline
            .prerequisites_of(&[a])
            .unwrap()
            .iter()
            .map(|c| c.symbolic_name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_resolve_package_in_order() {
        let baseline = BaselineBuilder::new("split")
            .component(Component::new("first", "1").with_type(Type::new("x.A", TypeKind::Class)))
            .component(Component::new("second", "1").with_type(Type::new("x.B", TypeKind::Class)))
            .build()
            .unwrap();
        let from = baseline.get_component("second").unwrap().unwrap();
        let providers: Vec<&str> = baseline
            .resolve_package(from, "x")
            .unwrap()
            .iter()
            .map(|c| c.symbolic_name.as_str())
            .collect();
        assert_eq!(providers, vec!["first", "second"]);
        let (owner, _) = baseline.find_type(from, "x.B").unwrap().unwrap();
        assert_eq!(owner.symbolic_name, "second");
    }

    #[test]
    fn test_missing_requirement_recorded() {
        let baseline = BaselineBuilder::new("broken")
            .component(
                Component::new("p", "1")
                    .requires("absent")
                    .with_requirement(ComponentRef::new("maybe").optional())
                    .with_type(Type::new("p.A", TypeKind::Class)),
            )
            .build()
            .unwrap();
        let p = baseline.get_component("p").unwrap().unwrap();
        let errors = p.resolution_errors.as_ref().expect("errors recorded");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("absent"));
        assert!(baseline.resolve_package(p, "p").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let result = BaselineBuilder::new("dup")
            .component(Component::new("p", "1"))
            .component(Component::new("p", "2"))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_disposed_baseline_fails() {
        let mut baseline = chain();
        baseline.dispose();
        assert!(baseline.components().unwrap_err().is_disposed());
        assert!(baseline.get_component("p1").unwrap_err().is_disposed());
        assert!(baseline.rename("other").unwrap_err().is_disposed());
    }

    #[test]
    fn test_rename_and_location() {
        let mut baseline = chain();
        baseline.rename("renamed").unwrap();
        baseline.set_location("/tmp/baseline.json").unwrap();
        assert_eq!(baseline.name(), "renamed");
        assert_eq!(baseline.location(), Some(Path::new("/tmp/baseline.json")));
    }
}
