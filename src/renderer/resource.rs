//! 常量缓冲区管理
//!
//! [`UploadBuffer`] 是一块按固定步长分槽的 uniform 缓冲区：
//! 每个槽按设备的 `min_uniform_buffer_offset_alignment` 对齐，
//! 通过动态偏移绑定。帧内先把数据写入 CPU 暂存区，
//! 渲染通道结束后一次性提交到 GPU。

use std::cell::RefCell;
use std::marker::PhantomData;

use bytemuck::Pod;
use tracing::debug;

/// 把 `size` 向上对齐到 `alignment`（`alignment` 为 0 时不对齐）
pub fn align_to(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        size
    } else {
        (size + alignment - 1) / alignment * alignment
    }
}

/// CPU 暂存区
#[derive(Debug, Clone)]
struct Staging {
    bytes: Vec<u8>,
    count: usize,
    stride: usize,
    capacity: usize,
}

impl Staging {
    fn new(stride: usize, capacity: usize) -> Self {
        Self {
            bytes: vec![0; stride * capacity],
            count: 0,
            stride,
            capacity,
        }
    }

    /// 写入下一个槽，返回槽的字节偏移；已满时返回 `None`
    fn push(&mut self, data: &[u8]) -> Option<usize> {
        if self.count >= self.capacity {
            return None;
        }
        let offset = self.count * self.stride;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.count += 1;
        Some(offset)
    }

    fn used_bytes(&self) -> &[u8] {
        &self.bytes[..self.count * self.stride]
    }
}

/// 分槽的 uniform 缓冲区
pub struct UploadBuffer<T: Pod> {
    buffer: wgpu::Buffer,
    label: String,
    stride: u64,
    staging: RefCell<Staging>,
    _phantom: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    /// 创建可容纳 `capacity` 个元素的缓冲区
    pub fn new(device: &wgpu::Device, capacity: usize, label: &str) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(std::mem::size_of::<T>() as u64, alignment);
        let capacity = capacity.max(1);
        Self {
            buffer: create_buffer(device, label, stride * capacity as u64),
            label: label.to_string(),
            stride,
            staging: RefCell::new(Staging::new(stride as usize, capacity)),
            _phantom: PhantomData,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// 每个槽的字节数
    pub fn element_size(&self) -> u64 {
        self.stride
    }

    pub fn capacity(&self) -> usize {
        self.staging.borrow().capacity
    }

    /// 本帧已写入的槽数
    pub fn len(&self) -> usize {
        self.staging.borrow().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 绑定单个元素时使用的大小
    pub fn binding_size() -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(std::mem::size_of::<T>() as u64)
    }

    /// 确保至少能容纳 `count` 个元素，不够时按 2 的幂扩容
    ///
    /// 返回 `true` 表示缓冲区被重新分配，引用它的绑定组需要重建。
    pub fn reserve(&mut self, device: &wgpu::Device, count: usize) -> bool {
        let capacity = self.capacity();
        if count <= capacity {
            return false;
        }
        let new_capacity = count.next_power_of_two();
        debug!(label = %self.label, from = capacity, to = new_capacity, "Growing upload buffer");
        self.buffer = create_buffer(device, &self.label, self.stride * new_capacity as u64);
        self.staging = RefCell::new(Staging::new(self.stride as usize, new_capacity));
        true
    }

    /// 清空本帧写入的数据
    pub fn reset(&self) {
        self.staging.borrow_mut().count = 0;
    }

    /// 写入下一个槽，返回动态偏移；缓冲区已满时返回 `None`
    pub fn push(&self, value: &T) -> Option<u32> {
        self.staging
            .borrow_mut()
            .push(bytemuck::bytes_of(value))
            .map(|offset| offset as u32)
    }

    /// 把本帧写入的数据提交到 GPU
    pub fn upload(&self, queue: &wgpu::Queue) {
        let staging = self.staging.borrow();
        if staging.count > 0 {
            queue.write_buffer(&self.buffer, 0, staging.used_bytes());
        }
    }
}

fn create_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(100, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(300, 256), 512);
        assert_eq!(align_to(192, 64), 192);
        assert_eq!(align_to(100, 0), 100);
    }

    #[test]
    fn test_staging_slots() {
        let mut staging = Staging::new(256, 2);
        assert_eq!(staging.push(&[1, 2, 3]), Some(0));
        assert_eq!(staging.push(&[4]), Some(256));
        assert_eq!(staging.push(&[5]), None);

        let used = staging.used_bytes();
        assert_eq!(used.len(), 512);
        assert_eq!(&used[..3], &[1, 2, 3]);
        assert_eq!(used[256], 4);
    }

    #[test]
    fn test_staging_reuse_after_reset() {
        let mut staging = Staging::new(16, 1);
        assert!(staging.push(&[9; 16]).is_some());
        staging.count = 0;
        assert_eq!(staging.push(&[7; 4]), Some(0));
        assert_eq!(staging.used_bytes()[0], 7);
    }
}
