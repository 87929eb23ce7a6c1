use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Anything that can hand the intersection provider a set of root nodes.
pub trait SceneGraph {
    fn children(&self) -> &[SceneObject];
}

/// Objects that may carry a lookup name.
///
/// `None` means the object was never named; an empty string is reported as-is
/// and rejected later by target validation.
pub trait Named {
    fn name(&self) -> Option<&str>;
}

/// Root of a scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Parses the scene XML produced by the authoring tools.
    ///
    /// Top-level `<object>` elements become root objects and nested
    /// `<object>` elements become their children.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let objects = document
            .root_element()
            .children()
            .filter(|n| n.has_tag_name("object"))
            .map(|node| parse_object(&node))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { objects })
    }

    /// Reads and parses a scene file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)
            .with_context(|| format!("unable to read scene {}", path.display()))?;
        Self::from_xml(&xml).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Walks every object in the tree, parents before children.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.objects)
    }

    /// Finds the first object with the given name, searching depth-first.
    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.descendants().find(|object| object.name == name)
    }
}

impl SceneGraph for Scene {
    fn children(&self) -> &[SceneObject] {
        &self.objects
    }
}

/// Scene object as described by the authoring tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneObject>,
}

impl SceneObject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: SceneObject) -> Self {
        self.children.push(child);
        self
    }

    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.children)
    }
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: "mesh".to_string(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            fov: default_fov(),
            children: Vec::new(),
        }
    }
}

impl SceneGraph for SceneObject {
    fn children(&self) -> &[SceneObject] {
        &self.children
    }
}

impl Named for SceneObject {
    fn name(&self) -> Option<&str> {
        Some(self.name.as_str())
    }
}

/// Depth-first, pre-order iterator over a forest of scene objects.
pub struct Descendants<'a> {
    stack: Vec<&'a SceneObject>,
}

impl<'a> Descendants<'a> {
    fn new(roots: &'a [SceneObject]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SceneObject;

    fn next(&mut self) -> Option<Self::Item> {
        let object = self.stack.pop()?;
        self.stack.extend(object.children.iter().rev());
        Some(object)
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_fov() -> f32 {
    45.0
}

fn parse_object(node: &Node<'_, '_>) -> Result<SceneObject> {
    let mut object = SceneObject::default();
    object.name = required_text(node, "name")?;
    if let Some(object_type) = optional_text(node, "type") {
        object.object_type = object_type;
    }
    object.position = parse_vec3(optional_text(node, "position"), object.position)?;
    object.rotation = parse_vec3(optional_text(node, "rotation"), object.rotation)?;
    object.scale = parse_vec3(optional_text(node, "scale"), object.scale)?;
    object.fov = parse_f32(optional_text(node, "fov"), object.fov)?;
    object.children = node
        .children()
        .filter(|child| child.has_tag_name("object"))
        .map(|child| parse_object(&child))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid children of {}", object.name))?;
    Ok(object)
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid vector component {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!(
            "vector needs 3 components, found {}",
            components.len()
        )),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
    <scene>
        <object>
            <name>Camera</name>
            <type>camera</type>
            <fov>90</fov>
            <position>0 0 5</position>
        </object>
        <object>
            <name>Table</name>
            <object>
                <name>Leg</name>
                <scale>0.1 1 0.1</scale>
            </object>
            <object>
                <name>Top</name>
                <object>
                    <name>Vase</name>
                </object>
            </object>
        </object>
    </scene>
    "#;

    #[test]
    fn parse_scene_builds_tree() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.objects.len(), 2);
        let camera = &scene.objects[0];
        assert_eq!(camera.object_type, "camera");
        assert_eq!(camera.fov, 90.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));

        let table = &scene.objects[1];
        assert_eq!(table.object_type, "mesh");
        assert_eq!(table.children.len(), 2);
        assert_eq!(table.children[0].scale, Vec3::new(0.1, 1.0, 0.1));
        assert_eq!(table.children[1].children[0].name, "Vase");
    }

    #[test]
    fn descendants_are_depth_first() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        let names: Vec<&str> = scene.descendants().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["Camera", "Table", "Leg", "Top", "Vase"]);

        let table = scene.find("Table").unwrap();
        let below: Vec<&str> = table.descendants().map(|o| o.name.as_str()).collect();
        assert_eq!(below, ["Leg", "Top", "Vase"]);
    }

    #[test]
    fn find_reaches_nested_objects() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert!(scene.find("Vase").is_some());
        assert!(scene.find("Chair").is_none());
    }

    #[test]
    fn missing_name_is_an_error() {
        let bad = "<scene><object><type>mesh</type></object></scene>";
        assert!(Scene::from_xml(bad).is_err());

        let nested = "<scene><object><name>A</name><object/></object></scene>";
        assert!(Scene::from_xml(nested).is_err());
    }

    #[test]
    fn short_vector_is_an_error() {
        let bad = "<scene><object><name>A</name><position>1 2</position></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn open_reads_scene_from_disk() {
        let mut tmp = NamedTempFile::new().expect("tmp file");
        tmp.write_all(SAMPLE.as_bytes()).expect("write scene");
        let scene = Scene::open(tmp.path()).unwrap();
        assert_eq!(scene.descendants().count(), 5);
    }

    #[test]
    fn builder_helpers_nest_children() {
        let root = SceneObject::named("Root").with_child(SceneObject::named("Child"));
        assert_eq!(root.children().len(), 1);
        assert_eq!(Named::name(&root), Some("Root"));
    }
}
