/// Depth compositor: per-frame y-sorted draw list.
///
/// Everything drawn between the ground layers and the roof layer is
/// submitted here with its world-Y key, then flushed back-to-front. Equal
/// keys keep submission order, so later submissions draw on top.

pub struct Scene<T> {
    entries: Vec<(i32, T)>,
}

impl<T> Scene<T> {
    pub fn new() -> Self {
        Scene { entries: Vec::new() }
    }

    pub fn submit(&mut self, item: T, y_key: i32) {
        self.entries.push((y_key, item));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand every submission to `draw` exactly once, ascending by key,
    /// and leave the scene empty for the next frame.
    pub fn flush(&mut self, mut draw: impl FnMut(T)) {
        // `sort_by_key` is stable.
        self.entries.sort_by_key(|&(key, _)| key);
        for (_, item) in self.entries.drain(..) {
            draw(item);
        }
    }
}

impl<T> Default for Scene<T> {
    fn default() -> Self {
        Scene::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_submission_order() {
        let mut scene = Scene::new();
        scene.submit("a50", 50);
        scene.submit("b10", 10);
        scene.submit("c50", 50);
        scene.submit("d30", 30);

        let mut drawn = Vec::new();
        scene.flush(|s| drawn.push(s));
        assert_eq!(drawn, vec!["b10", "d30", "a50", "c50"]);
    }

    #[test]
    fn flush_empties_the_scene() {
        let mut scene = Scene::new();
        scene.submit(1u8, 3);
        scene.submit(2u8, -4);
        assert_eq!(scene.len(), 2);

        let mut count = 0;
        scene.flush(|_| count += 1);
        assert_eq!(count, 2);
        assert!(scene.is_empty());

        scene.flush(|_| count += 1);
        assert_eq!(count, 2);
    }
}
