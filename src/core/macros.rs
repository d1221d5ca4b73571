//! 核心宏定义
//!
//! 提供统一的宏来减少配置结构体的样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use fluid_particles::impl_default;
///
/// struct MyStruct {
///     field1: u32,
///     field2: f32,
/// }
///
/// impl_default!(MyStruct {
///     field1: 0,
///     field2: 1.5,
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 将数值字段钳制到区间内，越界时记录警告
///
/// 用于配置的一次性校验，返回是否发生了钳制。
#[macro_export]
macro_rules! clamp_field {
    ($owner:expr, $field:ident, $min:expr, $max:expr) => {{
        let value = $owner.$field;
        let clamped = if value.is_nan() {
            $min
        } else {
            value.clamp($min, $max)
        };
        let changed = clamped != value || value.is_nan();
        if changed {
            tracing::warn!(
                target: "config",
                "{} = {} out of range [{}, {}], clamped to {}",
                stringify!($field),
                value,
                $min,
                $max,
                clamped
            );
            $owner.$field = clamped;
        }
        changed
    }};
}

#[cfg(test)]
mod tests {
    struct Sample {
        rate: f32,
        count: u32,
    }

    impl_default!(Sample {
        rate: 2.5,
        count: 3,
    });

    #[test]
    fn test_impl_default() {
        let sample = Sample::default();
        assert_eq!(sample.rate, 2.5);
        assert_eq!(sample.count, 3);
    }

    #[test]
    fn test_clamp_field() {
        let mut sample = Sample::default();
        sample.rate = 40.0;
        assert!(clamp_field!(sample, rate, 0.0, 10.0));
        assert_eq!(sample.rate, 10.0);
        assert!(!clamp_field!(sample, rate, 0.0, 10.0));

        sample.rate = f32::NAN;
        assert!(clamp_field!(sample, rate, 1.0, 10.0));
        assert_eq!(sample.rate, 1.0);
    }
}
