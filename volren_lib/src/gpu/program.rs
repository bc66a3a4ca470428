/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use std::collections::{HashMap, HashSet};

use super::{
    mesh::VERTEX_ATTRIBUTES,
    shader::{FragmentShader, Slot, StageInterface, UniformValue, Uniforms, ValueKind, VertexShader},
    MAX_VARYINGS,
};
use crate::error::{ShaderError, ShaderStage};

/// Linked pair of vertex and fragment shader with its uniform values
pub struct Program {
    name: String,
    vertex: Box<dyn VertexShader>,
    fragment: Box<dyn FragmentShader>,
    uniform_kinds: HashMap<&'static str, ValueKind>,
    uniforms: Uniforms,
}

impl Program {
    /// Compile both stages and link them.
    /// The error carries the full compile or link log.
    pub fn link(
        name: &str,
        vertex: Box<dyn VertexShader>,
        fragment: Box<dyn FragmentShader>,
    ) -> Result<Program, ShaderError> {
        let vertex_interface = vertex.interface();
        let fragment_interface = fragment.interface();

        compile(ShaderStage::Vertex, vertex.name(), &vertex_interface)?;
        compile(ShaderStage::Fragment, fragment.name(), &fragment_interface)?;

        let mut log = Vec::new();

        for (location, input) in fragment_interface.inputs.iter().enumerate() {
            let written = vertex_interface
                .outputs
                .iter()
                .enumerate()
                .find(|(_, out)| out.name == input.name);
            match written {
                None => log.push(format!(
                    "error: fragment input `{}` is not written by the vertex shader",
                    input.name
                )),
                Some((_, out)) if out.kind != input.kind => log.push(format!(
                    "error: type mismatch on varying `{}`: {:?} written, {:?} read",
                    input.name, out.kind, input.kind
                )),
                Some((out_location, _)) if out_location != location => log.push(format!(
                    "error: varying `{}` written at location {}, read at location {}",
                    input.name, out_location, location
                )),
                Some(_) => (),
            }
        }

        let mut uniform_kinds = HashMap::new();
        for slot in vertex_interface
            .uniforms
            .iter()
            .chain(fragment_interface.uniforms.iter())
        {
            match uniform_kinds.insert(slot.name, slot.kind) {
                Some(previous) if previous != slot.kind => log.push(format!(
                    "error: uniform `{}` declared as {:?} and {:?}",
                    slot.name, previous, slot.kind
                )),
                _ => (),
            }
        }

        if !log.is_empty() {
            return Err(ShaderError::Link {
                name: name.to_owned(),
                log: log.join("\n"),
            });
        }

        log::debug!(
            "Linked program `{}` ({} varyings, {} uniforms)",
            name,
            fragment_interface.inputs.len(),
            uniform_kinds.len()
        );

        Ok(Program {
            name: name.to_owned(),
            vertex,
            fragment,
            uniform_kinds,
            uniforms: Uniforms::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniform_kinds.contains_key(name)
    }

    /// Unknown names are ignored, values of a wrong type are rejected
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        let value = value.into();
        match self.uniform_kinds.get(name) {
            None => log::trace!("Program `{}` has no uniform `{}`", self.name, name),
            Some(kind) if !value.fits(*kind) => log::warn!(
                "Program `{}`: {:?} does not fit uniform `{}` of type {:?}",
                self.name,
                value,
                name,
                kind
            ),
            Some(_) => self.uniforms.set(name, value),
        }
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub(super) fn vertex_shader(&self) -> &dyn VertexShader {
        self.vertex.as_ref()
    }

    pub(super) fn fragment_shader(&self) -> &dyn FragmentShader {
        self.fragment.as_ref()
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("vertex", &self.vertex.name())
            .field("fragment", &self.fragment.name())
            .finish()
    }
}

// Validate the interface of a single stage
fn compile(stage: ShaderStage, name: &str, interface: &StageInterface) -> Result<(), ShaderError> {
    let mut log = Vec::new();

    let mut seen = HashSet::new();
    for slot in interface
        .inputs
        .iter()
        .chain(&interface.outputs)
        .chain(&interface.uniforms)
    {
        if !seen.insert(slot.name) {
            log.push(format!("error: redefinition of `{}`", slot.name));
        }
    }

    let varyings = match stage {
        ShaderStage::Vertex => &interface.outputs,
        ShaderStage::Fragment => &interface.inputs,
    };
    if varyings.len() > MAX_VARYINGS {
        log.push(format!(
            "error: too many varyings ({}, at most {})",
            varyings.len(),
            MAX_VARYINGS
        ));
    }
    for slot in varyings.iter().filter(|s| !s.kind.is_interpolable()) {
        log.push(format!(
            "error: varying `{}` cannot have type {:?}",
            slot.name, slot.kind
        ));
    }

    match stage {
        ShaderStage::Vertex => {
            for input in &interface.inputs {
                if !VERTEX_ATTRIBUTES.contains(input) {
                    log.push(format!("error: unknown vertex attribute `{}`", input.name));
                }
            }
        }
        ShaderStage::Fragment => {
            let single_color = matches!(
                interface.outputs.as_slice(),
                [Slot {
                    kind: ValueKind::Vec4,
                    ..
                }]
            );
            if !single_color {
                log.push("error: fragment shader must write exactly one vec4 color".to_owned());
            }
        }
    }

    if log.is_empty() {
        Ok(())
    } else {
        Err(ShaderError::Compile {
            stage,
            name: name.to_owned(),
            log: log.join("\n"),
        })
    }
}

#[cfg(test)]
mod test {

    use nalgebra::{Matrix4, Vector4};

    use super::*;
    use crate::{
        color::RGBA,
        gpu::{
            mesh::Vertex,
            shader::{Fragment, FragmentKernel, Samplers, Varyings, VertexKernel},
        },
    };

    struct TestVertex {
        outputs: Vec<Slot>,
    }

    struct PassKernel;

    impl VertexKernel for PassKernel {
        fn run(&self, vertex: &Vertex, _out: &mut Varyings) -> Vector4<f32> {
            vertex.position.to_homogeneous()
        }
    }

    impl FragmentKernel for PassKernel {
        fn run(&self, _fragment: &Fragment) -> Option<RGBA> {
            None
        }
    }

    impl VertexShader for TestVertex {
        fn name(&self) -> &str {
            "test.vert"
        }

        fn interface(&self) -> StageInterface {
            StageInterface {
                inputs: vec![Slot::new("position", ValueKind::Vec3)],
                outputs: self.outputs.clone(),
                uniforms: vec![Slot::new("MVP", ValueKind::Mat4)],
            }
        }

        fn prepare<'a>(&'a self, _uniforms: &'a Uniforms) -> Box<dyn VertexKernel + 'a> {
            Box::new(PassKernel)
        }
    }

    struct TestFragment {
        inputs: Vec<Slot>,
    }

    impl FragmentShader for TestFragment {
        fn name(&self) -> &str {
            "test.frag"
        }

        fn interface(&self) -> StageInterface {
            StageInterface {
                inputs: self.inputs.clone(),
                outputs: vec![Slot::new("fragColor", ValueKind::Vec4)],
                uniforms: vec![
                    Slot::new("step", ValueKind::Float),
                    Slot::new("volume", ValueKind::Sampler3D),
                ],
            }
        }

        fn prepare<'a>(&'a self, _uniforms: &'a Uniforms, _samplers: Samplers<'a>) -> Box<dyn FragmentKernel + 'a> {
            Box::new(PassKernel)
        }
    }

    fn link(outputs: Vec<Slot>, inputs: Vec<Slot>) -> Result<Program, ShaderError> {
        Program::link(
            "test",
            Box::new(TestVertex { outputs }),
            Box::new(TestFragment { inputs }),
        )
    }

    #[test]
    fn links_matching_stages() {
        let uv = Slot::new("uv", ValueKind::Vec3);
        let mut program = link(vec![uv], vec![uv]).unwrap();

        program.set_uniform("step", 0.25f32);
        program.set_uniform("volume", 0);
        program.set_uniform("MVP", Matrix4::identity());
        assert_eq!(program.uniforms().float("step"), 0.25);
        assert_eq!(program.uniforms().int("volume"), 0);

        // wrong type is rejected, unknown name ignored
        program.set_uniform("step", true);
        program.set_uniform("nonexistent", 1.0f32);
        assert_eq!(program.uniforms().float("step"), 0.25);
        assert!(program.uniforms().get("nonexistent").is_none());
    }

    #[test]
    fn link_error_has_log() {
        let err = link(
            vec![Slot::new("uv", ValueKind::Vec3)],
            vec![Slot::new("entry", ValueKind::Vec3)],
        )
        .unwrap_err();

        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(err.log().contains("`entry` is not written"));
        assert!(err.to_string().contains("`entry` is not written"));
    }

    #[test]
    fn varying_type_and_location_checked() {
        let a = Slot::new("a", ValueKind::Vec3);
        let b = Slot::new("b", ValueKind::Vec3);
        let err = link(vec![a, b], vec![b]).unwrap_err();
        assert!(err.log().contains("location"));

        let err = link(vec![a], vec![Slot::new("a", ValueKind::Vec4)]).unwrap_err();
        assert!(err.log().contains("type mismatch"));
    }

    #[test]
    fn compile_errors() {
        let too_many: Vec<Slot> = [
            "v0", "v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8",
        ]
        .into_iter()
        .map(|n| Slot::new(n, ValueKind::Float))
        .collect();
        let err = link(too_many, vec![]).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
        assert!(err.log().contains("too many varyings"));

        let err = link(vec![Slot::new("MVP", ValueKind::Vec3)], vec![]).unwrap_err();
        assert!(err.log().contains("redefinition of `MVP`"));

        let err = link(vec![], vec![Slot::new("m", ValueKind::Mat4)]).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }
}
