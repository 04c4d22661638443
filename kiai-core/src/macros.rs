#[doc(hidden)]
#[macro_export]
macro_rules! impl_point_ops {
    ($type:ident, $scalar:ty) => {
        impl Add<$type> for $type {
            type Output = $type;

            #[inline]
            fn add(self, other: $type) -> Self::Output {
                $type {
                    x: self.x + other.x,
                    y: self.y + other.y,
                }
            }
        }

        impl Sub<$type> for $type {
            type Output = $type;

            #[inline]
            fn sub(self, other: $type) -> Self::Output {
                $type {
                    x: self.x - other.x,
                    y: self.y - other.y,
                }
            }
        }

        impl Mul<$scalar> for $type {
            type Output = $type;

            #[inline]
            fn mul(self, other: $scalar) -> Self::Output {
                $type {
                    x: self.x * other,
                    y: self.y * other,
                }
            }
        }

        impl Mul<$type> for $scalar {
            type Output = $type;

            #[inline]
            fn mul(self, other: $type) -> Self::Output {
                other * self
            }
        }

        impl Neg for $type {
            type Output = $type;

            #[inline]
            fn neg(self) -> Self::Output {
                $type {
                    x: -self.x,
                    y: -self.y,
                }
            }
        }
    };
}
