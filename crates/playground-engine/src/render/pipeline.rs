use crate::device::{
    Backend, CompileFlags, InitError, InputElementDesc, RasterizerDesc, ShaderSource, ShaderStage,
};

/// Triangle shader source (WGSL).
pub const TRIANGLE_SHADER: &str = include_str!("shaders/triangle.wgsl");

/// Inputs for `Pipeline::build`.
#[derive(Debug, Clone)]
pub struct PipelineDesc<'a> {
    /// Name used in compiler diagnostics.
    pub name: &'a str,
    pub source: &'a str,
    pub vs_entry: &'a str,
    pub ps_entry: &'a str,
    pub flags: CompileFlags,
    pub rasterizer: RasterizerDesc,
    pub elements: &'a [InputElementDesc],
}

impl<'a> PipelineDesc<'a> {
    /// Triangle pipeline over `source` (normally `TRIANGLE_SHADER`).
    pub fn triangle(source: &'a str, elements: &'a [InputElementDesc], flags: CompileFlags) -> Self {
        Self {
            name: "triangle.wgsl",
            source,
            vs_entry: "vs_main",
            ps_entry: "ps_main",
            flags,
            rasterizer: RasterizerDesc::solid_no_cull(),
            elements,
        }
    }
}

/// Shader objects and fixed-function state for one draw configuration.
///
/// Built once and never mutated afterwards.
pub struct Pipeline<B: Backend> {
    pub vertex_shader: B::VertexShader,
    pub pixel_shader: B::PixelShader,
    pub input_layout: B::InputLayout,
    pub rasterizer: B::RasterizerState,
}

impl<B: Backend> Pipeline<B> {
    /// Compiles both stages and creates the pipeline objects.
    ///
    /// The vertex blob validates the input layout and is released before the
    /// pixel stage is compiled.
    pub fn build(backend: &mut B, desc: &PipelineDesc<'_>) -> Result<Self, InitError> {
        let (vertex_shader, input_layout) = {
            let vs_blob = compile(backend, desc, desc.vs_entry, ShaderStage::Vertex)?;
            let vertex_shader = backend
                .create_vertex_shader(&vs_blob)
                .map_err(|err| {
                    log::debug!("vertex shader creation: {err}");
                    InitError::ShaderCreate(ShaderStage::Vertex)
                })?;
            let input_layout = backend
                .create_input_layout(desc.elements, &vs_blob)
                .map_err(InitError::InputLayout)?;
            (vertex_shader, input_layout)
        };

        let pixel_shader = {
            let ps_blob = compile(backend, desc, desc.ps_entry, ShaderStage::Pixel)?;
            backend.create_pixel_shader(&ps_blob).map_err(|err| {
                log::debug!("pixel shader creation: {err}");
                InitError::ShaderCreate(ShaderStage::Pixel)
            })?
        };

        let rasterizer = backend
            .create_rasterizer_state(&desc.rasterizer)
            .map_err(InitError::Rasterizer)?;

        log::info!("pipeline `{}` built", desc.name);

        Ok(Self {
            vertex_shader,
            pixel_shader,
            input_layout,
            rasterizer,
        })
    }
}

fn compile<B: Backend>(
    backend: &mut B,
    desc: &PipelineDesc<'_>,
    entry_point: &str,
    stage: ShaderStage,
) -> Result<B::ShaderBlob, InitError> {
    let source = ShaderSource {
        name: desc.name,
        code: desc.source,
        entry_point,
    };
    backend
        .compile_shader(&source, stage, desc.flags)
        .map_err(|err| InitError::ShaderCompile {
            stage,
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::VertexPCU;
    use crate::testing::{journal, Call, Fail, Journal, RecordingBackend, Resource};

    fn backend(fail: Option<Fail>) -> (RecordingBackend, Journal) {
        let journal = journal();
        let mut backend = RecordingBackend::bootstrap(journal.clone(), (800, 600));
        if let Some(op) = fail {
            backend.fail(op);
        }
        (backend, journal)
    }

    fn build(backend: &mut RecordingBackend, source: &str) -> Result<Pipeline<RecordingBackend>, InitError> {
        Pipeline::build(
            backend,
            &PipelineDesc::triangle(source, &VertexPCU::INPUT_LAYOUT, CompileFlags::DEBUG),
        )
    }

    #[test]
    fn pixel_shader_compile_failure_is_reported() {
        let (mut backend, journal) = backend(None);
        let Err(err) = build(&mut backend, "@vertex fn vs_main(p: vec3<f32>) {}") else {
            panic!("pixel stage should not compile");
        };
        assert!(matches!(err, InitError::ShaderCompile { stage: ShaderStage::Pixel, .. }));
        assert!(err.to_string().starts_with("failed to compile pixel shader: "));

        // Vertex objects built before the failure are released.
        let calls = journal.borrow();
        assert!(calls.iter().any(|c| matches!(c, Call::Release(Resource::VertexShader, _))));
        assert!(calls.iter().any(|c| matches!(c, Call::Release(Resource::InputLayout, _))));
    }

    #[test]
    fn creation_failures_map_to_their_startup_error() {
        let cases: [(Fail, fn(&InitError) -> bool); 4] = [
            (Fail::CreateVertexShader, |e| {
                matches!(e, InitError::ShaderCreate(ShaderStage::Vertex))
            }),
            (Fail::CreateInputLayout, |e| matches!(e, InitError::InputLayout(_))),
            (Fail::CreatePixelShader, |e| {
                matches!(e, InitError::ShaderCreate(ShaderStage::Pixel))
            }),
            (Fail::CreateRasterizer, |e| matches!(e, InitError::Rasterizer(_))),
        ];

        for (op, expected) in cases {
            let (mut backend, _journal) = backend(Some(op));
            let Err(err) = build(&mut backend, TRIANGLE_SHADER) else {
                panic!("{op:?} should abort the build");
            };
            assert!(expected(&err), "{op:?} produced {err:?}");
        }
    }

    #[test]
    fn shader_create_failure_uses_the_fixed_message() {
        let (mut backend, _journal) = backend(Some(Fail::CreateVertexShader));
        let Err(err) = build(&mut backend, TRIANGLE_SHADER) else {
            panic!("vertex shader creation should fail");
        };
        assert_eq!(err.to_string(), "failed to create vertex shader");
    }
}
