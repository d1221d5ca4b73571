//! 对象池 - 回收粒子记录，预热后每帧零分配

/// 可重置对象 trait
pub trait Resettable {
    /// 重置对象到初始状态
    fn reset(&mut self);
}

/// 对象池统计信息
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    /// 总获取次数
    pub allocations: usize,
    /// 总归还次数
    pub releases: usize,
    /// 缓存命中次数
    pub cache_hits: usize,
    /// 当前可用对象数
    pub available: usize,
    /// 池最大大小
    pub max_size: usize,
}

impl PoolStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f32 {
        if self.allocations == 0 {
            0.0
        } else {
            self.cache_hits as f32 / self.allocations as f32
        }
    }
}

/// 可重置对象池
///
/// 空闲列表是一个连续的 `Vec`，归还时调用 `reset()`，获取时从尾部弹出。
pub struct ResettablePool<T: Resettable + Default> {
    available: Vec<T>,
    max_size: usize,
    allocations: usize,
    releases: usize,
    cache_hits: usize,
}

impl<T: Resettable + Default> ResettablePool<T> {
    /// 创建对象池
    pub fn new(initial_size: usize, max_size: usize) -> Self {
        let mut pool = Self {
            available: Vec::with_capacity(initial_size.min(max_size)),
            max_size,
            allocations: 0,
            releases: 0,
            cache_hits: 0,
        };
        pool.warm_up(initial_size);
        pool
    }

    /// 从池中获取对象，池为空时新建
    pub fn acquire(&mut self) -> T {
        self.allocations += 1;
        match self.available.pop() {
            Some(obj) => {
                self.cache_hits += 1;
                obj
            }
            None => T::default(),
        }
    }

    /// 将对象归还到池中 (自动重置)
    pub fn release(&mut self, mut obj: T) {
        self.releases += 1;
        if self.available.len() < self.max_size {
            obj.reset();
            self.available.push(obj);
        }
        // 如果池已满,对象将被丢弃
    }

    /// 预热池 - 预先分配对象
    pub fn warm_up(&mut self, count: usize) {
        let to_add = count.min(self.max_size.saturating_sub(self.available.len()));
        self.available.reserve(to_add);
        for _ in 0..to_add {
            self.available.push(T::default());
        }
    }

    /// 获取池中可用对象的数量
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// 设置最大池大小，超出部分被丢弃
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.available.truncate(max_size);
    }

    /// 获取池统计信息
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocations: self.allocations,
            releases: self.releases,
            cache_hits: self.cache_hits,
            available: self.available.len(),
            max_size: self.max_size,
        }
    }

    /// 重置统计信息
    pub fn reset_stats(&mut self) {
        self.allocations = 0;
        self.releases = 0;
        self.cache_hits = 0;
    }
}
