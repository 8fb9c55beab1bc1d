/// Vertex stage shared by full-screen passes (WGSL).
/// Three vertices from `vertex_index` cover the viewport; no vertex buffer.
/// Outputs UVs with (0,0) at the top-left of the screen.
pub const FULLSCREEN_TRIANGLE_VS_WITH_UV: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4f,
    @location(0) uv: vec2f,
}

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VertexOutput {
    let x = f32(i32(vi & 1u) * 4) - 1.0;
    let y = f32(i32(vi & 2u) * 2) - 1.0;
    var out: VertexOutput;
    out.position = vec4f(x, y, 0.0, 1.0);
    out.uv = vec2f((x + 1.0) * 0.5, (1.0 - y) * 0.5);
    return out;
}
"#;
