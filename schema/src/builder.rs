//! SchemaBuilder for constructing an immutable SchemaStore.

use crate::{
    ClassDef, ClassHierarchy, PropertyDef, PropertyRange, SchemaError, SchemaResult, SchemaStore,
    XorGroup,
};
use shipval_core::{ClassId, PropertyId, QuantityKind};
use std::collections::BTreeMap;

/// Builder for constructing an immutable SchemaStore.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    version: String,
    quantity_kinds: BTreeMap<QuantityKind, String>,
    classes: BTreeMap<ClassId, ClassDef>,
    properties: BTreeMap<PropertyId, PropertyDef>,
}

impl SchemaBuilder {
    /// Create a new builder for the given schema version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Declare a quantity kind with its canonical unit.
    pub fn quantity_kind(
        &mut self,
        kind: impl Into<QuantityKind>,
        canonical_unit: impl Into<String>,
    ) -> &mut Self {
        self.quantity_kinds.insert(kind.into(), canonical_unit.into());
        self
    }

    /// Add a class definition.
    pub fn add_class(&mut self, name: impl Into<String>) -> ClassBuilder<'_> {
        ClassBuilder {
            builder: self,
            id: ClassId::new(name),
            parent: None,
            properties: Vec::new(),
            xor_groups: Vec::new(),
        }
    }

    /// Build the immutable SchemaStore.
    ///
    /// Parents may be declared in any order; they are resolved here.
    pub fn build(self) -> SchemaResult<SchemaStore> {
        let hierarchy = ClassHierarchy::build(&self.classes)?;

        for def in self.properties.values() {
            match &def.range {
                PropertyRange::Quantity(kind) if !self.quantity_kinds.contains_key(kind) => {
                    return Err(SchemaError::UnknownQuantityKind {
                        property: def.id.to_string(),
                        kind: kind.to_string(),
                    });
                }
                PropertyRange::Class(class) if !self.classes.contains_key(class) => {
                    return Err(SchemaError::UnknownRangeClass {
                        property: def.id.to_string(),
                        class: class.to_string(),
                    });
                }
                PropertyRange::Enumeration(members) if members.is_empty() => {
                    return Err(SchemaError::EmptyEnumeration(def.id.to_string()));
                }
                _ => {}
            }
        }

        // XOR members must be applicable to the declaring class
        for class in self.classes.values() {
            for group in &class.xor_groups {
                if group.members.len() < 2 {
                    return Err(SchemaError::XorGroupTooSmall {
                        class: class.id.to_string(),
                        group: group.name.clone(),
                    });
                }
                for member in &group.members {
                    let applicable = self
                        .properties
                        .get(member)
                        .is_some_and(|p| hierarchy.is_subclass_of(class.id.as_str(), p.domain.as_str()));
                    if !applicable {
                        return Err(SchemaError::UnknownXorMember {
                            class: class.id.to_string(),
                            group: group.name.clone(),
                            member: member.to_string(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            version = %self.version,
            classes = self.classes.len(),
            properties = self.properties.len(),
            "schema built"
        );

        Ok(SchemaStore::new(
            self.version,
            self.quantity_kinds,
            self.classes,
            self.properties,
            hierarchy,
        ))
    }
}

/// Builder for a class definition.
pub struct ClassBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    id: ClassId,
    parent: Option<ClassId>,
    properties: Vec<PropertyDef>,
    xor_groups: Vec<XorGroup>,
}

impl<'a> ClassBuilder<'a> {
    /// Set the parent class by name.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(ClassId::new(parent));
        self
    }

    /// Declare a property on this class.
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Declare mutually exclusive alternatives.
    pub fn xor<S: Into<PropertyId>>(
        mut self,
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
    ) -> Self {
        self.xor_groups.push(XorGroup {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Finish building this class.
    pub fn done(self) -> SchemaResult<ClassId> {
        if self.builder.classes.contains_key(&self.id) {
            return Err(SchemaError::DuplicateClass(self.id.to_string()));
        }

        let mut property_ids = Vec::with_capacity(self.properties.len());
        for mut property in self.properties {
            if self.builder.properties.contains_key(&property.id) {
                return Err(SchemaError::DuplicateProperty(property.id.to_string()));
            }
            property.domain = self.id.clone();
            property_ids.push(property.id.clone());
            self.builder.properties.insert(property.id.clone(), property);
        }

        let class = ClassDef {
            id: self.id.clone(),
            parent: self.parent,
            properties: property_ids,
            xor_groups: self.xor_groups,
        };
        self.builder.classes.insert(self.id.clone(), class);

        Ok(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== TEST: duplicate_class ==========
    #[test]
    fn test_duplicate_class() {
        // GIVEN builder with class Propeller
        let mut builder = SchemaBuilder::new("1");
        builder.add_class("Propeller").done().unwrap();

        // WHEN adding Propeller again
        let result = builder.add_class("Propeller").done();

        // THEN DuplicateClass
        assert!(matches!(result, Err(SchemaError::DuplicateClass(_))));
    }

    // ========== TEST: duplicate_property_across_classes ==========
    #[test]
    fn test_duplicate_property_across_classes() {
        // GIVEN builder where Propeller declares "diameter"
        let mut builder = SchemaBuilder::new("1");
        builder.quantity_kind("length", "m");
        builder
            .add_class("Propeller")
            .property(PropertyDef::quantity("diameter", "length"))
            .done()
            .unwrap();

        // WHEN Nozzle declares "diameter" too
        let result = builder
            .add_class("Nozzle")
            .property(PropertyDef::quantity("diameter", "length"))
            .done();

        // THEN property ids are unique across the schema
        assert!(matches!(result, Err(SchemaError::DuplicateProperty(_))));
    }

    // ========== TEST: unknown_quantity_kind ==========
    #[test]
    fn test_unknown_quantity_kind() {
        let mut builder = SchemaBuilder::new("1");
        builder
            .add_class("PrimeMover")
            .property(PropertyDef::quantity("mcrPower", "power"))
            .done()
            .unwrap();

        let result = builder.build();

        assert!(matches!(result, Err(SchemaError::UnknownQuantityKind { .. })));
    }

    // ========== TEST: inheritance_cycle ==========
    #[test]
    fn test_inheritance_cycle() {
        // GIVEN A extends B and B extends A
        let mut builder = SchemaBuilder::new("1");
        builder.add_class("A").extends("B").done().unwrap();
        builder.add_class("B").extends("A").done().unwrap();

        // WHEN build
        let result = builder.build();

        // THEN InheritanceCycle
        assert!(matches!(result, Err(SchemaError::InheritanceCycle(_))));
    }

    // ========== TEST: parent_declared_after_child ==========
    #[test]
    fn test_parent_declared_after_child() {
        let mut builder = SchemaBuilder::new("1");
        builder.add_class("Propeller").extends("Propulsor").done().unwrap();
        builder.add_class("Propulsor").done().unwrap();

        let schema = builder.build().unwrap();

        assert!(schema.is_subclass_of("Propeller", "Propulsor"));
    }

    // ========== TEST: xor_group_validation ==========
    #[test]
    fn test_xor_group_validation() {
        // GIVEN a XOR group naming a property the class does not have
        let mut builder = SchemaBuilder::new("1");
        builder.add_class("PropulsorSystem").done().unwrap();
        builder
            .add_class("PropulsionSystem")
            .property(PropertyDef::relation("hasPropulsor", "PropulsorSystem"))
            .xor("propulsionUnit", ["hasPropulsor", "hasThruster"])
            .done()
            .unwrap();

        // WHEN build
        let result = builder.build();

        // THEN UnknownXorMember
        assert!(matches!(
            result,
            Err(SchemaError::UnknownXorMember { ref member, .. }) if member == "hasThruster"
        ));
    }

    // ========== TEST: xor_group_too_small ==========
    #[test]
    fn test_xor_group_too_small() {
        let mut builder = SchemaBuilder::new("1");
        builder.add_class("PropulsorSystem").done().unwrap();
        builder
            .add_class("PropulsionSystem")
            .property(PropertyDef::relation("hasPropulsor", "PropulsorSystem"))
            .xor("propulsionUnit", ["hasPropulsor"])
            .done()
            .unwrap();

        assert!(matches!(
            builder.build(),
            Err(SchemaError::XorGroupTooSmall { .. })
        ));
    }
}
