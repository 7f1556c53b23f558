use bytemuck::{Pod, Zeroable};
use conway_life::config::Palette;
use conway_life::{Grid, Position};
use std::iter;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

// Per-cell flags in the cell buffer, mirrored in render.wgsl.
pub const ALIVE: u32 = 1;
pub const HIGHLIGHTED: u32 = 2;
pub const CANDIDATE: u32 = 4;

/// Grid lines are drawn once a cell is at least this many screen pixels wide.
const MIN_LINE_CELL_PX: f32 = 3.0;

// Uniforms specific to rendering
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RenderParams {
    pub view_offset: [f32; 2],
    pub zoom: f32,
    pub cell_size: f32,
    pub grid_size: [u32; 2],
    pub show_lines: u32,
    pub debug: u32,
}

impl RenderParams {
    pub fn new(
        view_offset: [f32; 2],
        zoom: f32,
        cell_size: u32,
        grid_size: (u32, u32),
        debug: bool,
    ) -> Self {
        Self {
            view_offset,
            zoom,
            cell_size: cell_size as f32,
            grid_size: [grid_size.0, grid_size.1],
            show_lines: (cell_size as f32 * zoom >= MIN_LINE_CELL_PX) as u32,
            debug: debug as u32,
        }
    }
}

/// Shader-compatible palette, linear colours.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShaderPalette {
    pub background: [f32; 4],
    pub line: [f32; 4],
    pub void: [f32; 4],
    pub cell: [f32; 4],
    pub highlighted: [f32; 4],
    pub debug: [f32; 4],
    pub debug_neighbour: [f32; 4],
}

impl From<&Palette> for ShaderPalette {
    fn from(palette: &Palette) -> Self {
        Self {
            background: palette.background.linear(),
            line: palette.line.linear(),
            void: palette.void.linear(),
            cell: palette.cell.linear(),
            highlighted: palette.highlighted.linear(),
            debug: palette.debug.linear(),
            debug_neighbour: palette.debug_neighbour.linear(),
        }
    }
}

/// Packs the board into one `u32` of flags per cell, row-major.
///
/// `highlight` is the pattern preview in board coordinates. With `debug`
/// the cells the next update will evaluate are flagged too. Never empty,
/// since wgpu rejects zero-sized bindings.
pub fn pack_cells(grid: &Grid, highlight: &[Position], debug: bool) -> Vec<u32> {
    let mut cells = vec![0u32; grid.area().max(1)];
    let mut flag = |position: Position, bit: u32| {
        if let Some(index) = grid.index(position) {
            cells[index] |= bit;
        }
    };

    for &position in grid.alive_positions() {
        flag(position, ALIVE);
        if debug {
            for candidate in iter::once(position).chain(grid.neighbours(position)) {
                flag(candidate, CANDIDATE);
            }
        }
    }
    for &position in highlight {
        flag(position, HIGHLIGHTED);
    }
    cells
}

pub fn create_render_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Render Bind Group Layout"),
        entries: &[
            // RenderParams Uniform (Binding 0)
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<RenderParams>() as u64),
                },
                count: None,
            },
            // Cell flags (Binding 1)
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // Palette Uniform (Binding 2)
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ShaderPalette>() as u64),
                },
                count: None,
            },
        ],
    })
}

pub fn create_render_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    param_buffer: &wgpu::Buffer,
    cell_buffer: &wgpu::Buffer,
    palette_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Render Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: param_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: cell_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: palette_buffer.as_entire_binding() },
        ],
    })
}

fn create_cell_buffer(device: &wgpu::Device, cells: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Cell Buffer"),
        size: (cells.max(1) * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Draws the board with a full-screen triangle.
pub struct GridRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    param_buffer: wgpu::Buffer,
    palette_buffer: wgpu::Buffer,
    cell_buffer: wgpu::Buffer,
    cell_capacity: usize,
}

impl GridRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        palette: &Palette,
        cells: usize,
    ) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Render Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("render.wgsl").into()),
        });

        let param_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Render Parameters"),
            size: std::mem::size_of::<RenderParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let palette_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Palette Buffer"),
            contents: bytemuck::bytes_of(&ShaderPalette::from(palette)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let cell_capacity = cells.max(1);
        let cell_buffer = create_cell_buffer(device, cell_capacity);

        let bind_group_layout = create_render_bind_group_layout(device);
        let bind_group = create_render_bind_group(
            device, &bind_group_layout, &param_buffer, &cell_buffer, &palette_buffer,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(format.into())],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            bind_group,
            param_buffer,
            palette_buffer,
            cell_buffer,
            cell_capacity,
        }
    }

    /// Writes this frame's uniforms and cells, growing the cell buffer if the board grew.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: &RenderParams,
        cells: &[u32],
    ) {
        if cells.len() > self.cell_capacity {
            self.cell_capacity = cells.len();
            self.cell_buffer = create_cell_buffer(device, self.cell_capacity);
            self.bind_group = create_render_bind_group(
                device,
                &self.bind_group_layout,
                &self.param_buffer,
                &self.cell_buffer,
                &self.palette_buffer,
            );
            log::info!("Cell buffer grown to {} cells", self.cell_capacity);
        }
        queue.write_buffer(&self.param_buffer, 0, bytemuck::bytes_of(params));
        queue.write_buffer(&self.cell_buffer, 0, bytemuck::cast_slice(cells));
    }

    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1); // Draw full-screen triangle
    }
}
