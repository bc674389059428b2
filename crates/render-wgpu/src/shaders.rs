use globe_render::shading::{ATMOSPHERE_COLOR, ATMOSPHERE_RIM_BIAS};

/// Uniform block shared by the globe and atmosphere shaders.
const MESH_UNIFORMS: &str = r#"
struct MeshUniforms {
    model_view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    sun_position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> mesh: MeshUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};
"#;

/// Format a float as a WGSL literal (always with a decimal point or exponent).
fn wgsl_float(value: f32) -> String {
    format!("{value:?}")
}

/// WGSL for the day/night globe. Lighting happens in view space.
pub fn globe_shader(terminator_sharpness: f32) -> String {
    format!(
        r#"{MESH_UNIFORMS}
@group(1) @binding(0)
var day_texture: texture_2d<f32>;
@group(1) @binding(1)
var night_texture: texture_2d<f32>;
@group(1) @binding(2)
var globe_sampler: sampler;

struct GlobeVarying {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) vert_to_light: vec3<f32>,
}};

@vertex
fn vs_globe(vertex: VertexInput) -> GlobeVarying {{
    let view_position = mesh.model_view * vec4<f32>(vertex.position, 1.0);

    var out: GlobeVarying;
    out.uv = vertex.uv;
    out.normal = (mesh.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.vert_to_light = normalize(mesh.sun_position.xyz - view_position.xyz);
    out.clip_position = mesh.projection * view_position;
    return out;
}}

@fragment
fn fs_globe(in: GlobeVarying) -> @location(0) vec4<f32> {{
    let day = textureSample(day_texture, globe_sampler, in.uv).rgb;
    let night = textureSample(night_texture, globe_sampler, in.uv).rgb;

    var cos_theta = dot(normalize(in.normal), normalize(in.vert_to_light));
    cos_theta = clamp(cos_theta * {sharpness}, -1.0, 1.0);
    let day_weight = cos_theta * 0.5 + 0.5;

    return vec4<f32>(mix(night, day, day_weight), 1.0);
}}
"#,
        sharpness = wgsl_float(terminator_sharpness),
    )
}

/// WGSL for the atmosphere shell, blended additively.
pub fn atmosphere_shader() -> String {
    let [r, g, b] = ATMOSPHERE_COLOR.map(wgsl_float);
    format!(
        r#"{MESH_UNIFORMS}
struct AtmosphereVarying {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
}};

@vertex
fn vs_atmosphere(vertex: VertexInput) -> AtmosphereVarying {{
    var out: AtmosphereVarying;
    out.normal = normalize((mesh.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.clip_position = mesh.projection * mesh.model_view * vec4<f32>(vertex.position, 1.0);
    return out;
}}

@fragment
fn fs_atmosphere(in: AtmosphereVarying) -> @location(0) vec4<f32> {{
    let d = {bias} - dot(in.normal, vec3<f32>(0.0, 0.0, 1.0));
    let intensity = d * d;
    return vec4<f32>({r}, {g}, {b}, 1.0) * intensity;
}}
"#,
        bias = wgsl_float(ATMOSPHERE_RIM_BIAS),
    )
}

/// WGSL for the unlit star points.
pub const STAR_SHADER: &str = r#"
struct StarUniforms {
    view_proj: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> stars: StarUniforms;

@vertex
fn vs_stars(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return stars.view_proj * vec4<f32>(position, 1.0);
}

@fragment
fn fs_stars() -> @location(0) vec4<f32> {
    return stars.color;
}
"#;
